use crate::error::{NoduError, Result};
use crate::tutors::{self, TutorDescriptor};
use colored::Colorize;
use prettytable::{format, Table};
use serde::Serialize;

/// Serializable view of a registered tutor
#[derive(Debug, Serialize)]
pub struct TutorSummary {
    /// Frontend id, as accepted by `/tutor` and `--tutor`
    pub id: &'static str,
    /// Key used on the wire
    pub backend_key: &'static str,
    /// Display name
    pub display_name: &'static str,
    /// Avatar initials
    pub icon: &'static str,
}

impl From<&TutorDescriptor> for TutorSummary {
    fn from(d: &TutorDescriptor) -> Self {
        Self {
            id: d.id.as_str(),
            backend_key: d.backend_key,
            display_name: d.display_name,
            icon: d.visual_theme.icon,
        }
    }
}

/// Registered tutors as pretty-printed JSON
pub fn tutors_json() -> Result<String> {
    let summaries: Vec<TutorSummary> = tutors::all().iter().map(TutorSummary::from).collect();
    Ok(serde_json::to_string_pretty(&summaries).map_err(NoduError::Serialization)?)
}

/// List the registered tutors
pub fn list_tutors(json: bool) -> Result<()> {
    if json {
        println!("{}", tutors_json()?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(prettytable::row![
        "ID".bold(),
        "Tutor".bold(),
        "Backend Key".bold()
    ]);
    for descriptor in tutors::all() {
        table.add_row(prettytable::row![
            descriptor.id.as_str().cyan(),
            format!("[{}] {}", descriptor.visual_theme.icon, descriptor.display_name),
            descriptor.backend_key
        ]);
    }

    println!("\nAvailable tutors:");
    table.printstd();
    println!();
    println!(
        "Use {} to start a session.",
        "nodu chat --tutor <ID>".cyan()
    );
    println!();
    Ok(())
}
