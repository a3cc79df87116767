use crate::backend::{ChatBackend, HttpBackend};
use crate::config::Config;
use crate::error::{NoduError, Result};
use crate::session::{HistoryEntry, HistoryStore};
use colored::Colorize;
use prettytable::{format, Table};
use serde::Serialize;

/// Serializable row of the history listing
#[derive(Debug, Serialize)]
pub struct HistoryRow {
    /// Frontend id of the tutor
    pub tutor: &'static str,
    /// Key the backend stores the transcript under
    pub backend_key: String,
    /// Number of stored messages
    pub messages: usize,
    /// RFC 3339 timestamp of the last change
    pub last_updated: Option<String>,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            tutor: entry.tutor.as_str(),
            backend_key: entry.backend_key.clone(),
            messages: entry.message_count,
            last_updated: entry.last_updated.map(|t| t.to_rfc3339()),
        }
    }
}

/// Fetch the history once and return its overview
pub async fn load_overview(backend: &dyn ChatBackend) -> Vec<HistoryEntry> {
    let mut store = HistoryStore::new();
    store.load(backend).await;
    store.overview()
}

/// Overview rows as pretty-printed JSON
pub fn history_json(entries: &[HistoryEntry]) -> Result<String> {
    let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
    Ok(serde_json::to_string_pretty(&rows).map_err(NoduError::Serialization)?)
}

/// Show the conversation history stored on the backend
pub async fn show_history(config: Config, json: bool) -> Result<()> {
    let backend = HttpBackend::new(&config.server)?;
    let entries = load_overview(&backend).await;

    if json {
        println!("{}", history_json(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        if config.server.session_cookie.is_none() {
            println!(
                "History is only available to logged-in sessions; set {} or pass {}.",
                "NODU_SESSION_COOKIE".cyan(),
                "--cookie".cyan()
            );
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Tutor".bold(),
        "Key".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);
    for entry in &entries {
        let updated = entry
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![
            entry.display_name.cyan(),
            entry.backend_key,
            entry.message_count,
            updated
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    println!(
        "Use {} to continue a conversation.",
        "nodu chat --tutor <ID>".cyan()
    );
    println!();
    Ok(())
}
