//! Command-line interface definition for NODU
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// NODU - tutoring chat in the terminal
///
/// Talk with the NODU tutors, replay past conversations and attach
/// images or PDFs to your questions.
#[derive(Parser, Debug, Clone)]
#[command(name = "nodu")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/nodu.yaml")]
    pub config: Option<String>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    pub server: Option<String>,

    /// Session cookie of a logged-in backend session (overrides config)
    #[arg(long)]
    pub cookie: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for NODU
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive tutoring session
    Chat {
        /// Tutor to open immediately (generale, scientifica, umanistica)
        #[arg(short, long)]
        tutor: Option<String>,
    },

    /// List the available tutors
    Tutors {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the conversation history stored on the backend
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/nodu.yaml".to_string()),
            server: None,
            cookie: None,
            verbose: false,
            json_logs: false,
            command: Commands::Chat { tutor: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/nodu.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { tutor: None }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["nodu", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { tutor: None }));
    }

    #[test]
    fn test_cli_parse_chat_with_tutor() {
        let cli = Cli::try_parse_from(["nodu", "chat", "--tutor", "scientifica"]).unwrap();
        if let Commands::Chat { tutor } = cli.command {
            assert_eq!(tutor, Some("scientifica".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "nodu",
            "--server",
            "http://127.0.0.1:8080",
            "--cookie",
            "session=abc",
            "history",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cli.cookie.as_deref(), Some("session=abc"));
        assert!(matches!(cli.command, Commands::History { json: true }));
    }

    #[test]
    fn test_cli_parse_tutors() {
        let cli = Cli::try_parse_from(["nodu", "tutors"]).unwrap();
        assert!(matches!(cli.command, Commands::Tutors { json: false }));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["nodu"]).is_err());
    }
}
