//! Special commands parser for the interactive tutoring session
//!
//! Lines starting with `/` drive the session instead of being sent to the
//! tutor: choosing a tutor, attaching files, moving between views and
//! reopening past conversations. Commands are case-insensitive; arguments
//! such as file paths keep their case.

use crate::session::View;
use crate::tutors;
use std::path::PathBuf;
use thiserror::Error;

/// Every command name, used for "did you mean" hints
const COMMAND_NAMES: &[&str] = &[
    "/tutor", "/tutors", "/attach", "/detach", "/home", "/back", "/chat", "/profile",
    "/history", "/open", "/settings", "/status", "/help", "/exit",
];

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {command}{}\n\nType '/help' to see available commands", hint(.suggestion))]
    UnknownCommand {
        command: String,
        suggestion: Option<&'static str>,
    },

    /// Tutor id is not registered
    #[error("Unknown tutor: {id}{}\n\nType '/tutors' to list them", hint(.suggestion))]
    UnknownTutor {
        id: String,
        suggestion: Option<&'static str>,
    },

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

fn hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Special commands that can be executed during a tutoring session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Open the chat with a tutor, by frontend id
    SelectTutor(String),

    /// List the registered tutors
    ListTutors,

    /// Stage a file from disk for the next message
    Attach(PathBuf),

    /// Drop the staged file
    Detach,

    /// Switch the visible view
    Navigate(View),

    /// Reopen the n-th (zero-based) history row
    OpenHistory(usize),

    /// Display session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input is a message for the active tutor.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not a valid command.
/// Returns `CommandError::UnknownTutor` if `/tutor` names an unregistered tutor.
/// Returns `CommandError::UnsupportedArgument` if a command receives an invalid argument.
/// Returns `CommandError::MissingArgument` if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use nodu::commands::special_commands::{parse_special_command, SpecialCommand};
/// use nodu::session::View;
///
/// let cmd = parse_special_command("/tutor Scientifica").unwrap();
/// assert_eq!(cmd, SpecialCommand::SelectTutor("scientifica".to_string()));
///
/// let cmd = parse_special_command("/home").unwrap();
/// assert_eq!(cmd, SpecialCommand::Navigate(View::Dashboard));
///
/// let cmd = parse_special_command("Cos'è una derivata?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/tutr generale").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/tutor" => {
            if arg.is_empty() {
                return Err(missing("/tutor", "/tutor <generale|scientifica|umanistica>"));
            }
            let id = arg.to_lowercase();
            if tutors::lookup(&id).is_none() {
                return Err(CommandError::UnknownTutor {
                    suggestion: tutors::suggest(&id),
                    id,
                });
            }
            Ok(SpecialCommand::SelectTutor(id))
        }
        "/attach" => {
            if arg.is_empty() {
                return Err(missing("/attach", "/attach <path to image or PDF>"));
            }
            Ok(SpecialCommand::Attach(PathBuf::from(arg)))
        }
        "/open" => {
            if arg.is_empty() {
                return Err(missing("/open", "/open <number from /history>"));
            }
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(SpecialCommand::OpenHistory(n - 1)),
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/open".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }
        _ => {
            let command = match name.as_str() {
                "/tutors" => SpecialCommand::ListTutors,
                "/detach" => SpecialCommand::Detach,
                "/home" | "/dashboard" | "/back" => SpecialCommand::Navigate(View::Dashboard),
                "/chat" => SpecialCommand::Navigate(View::Chat),
                "/profile" => SpecialCommand::Navigate(View::Profile),
                "/history" => SpecialCommand::Navigate(View::History),
                "/settings" => SpecialCommand::Navigate(View::Settings),
                "/status" => SpecialCommand::ShowStatus,
                "/help" | "/?" => SpecialCommand::Help,
                "/exit" | "/quit" | "exit" | "quit" => SpecialCommand::Exit,
                _ => {
                    return Err(CommandError::UnknownCommand {
                        suggestion: suggest_command(&name),
                        command: name.clone(),
                    })
                }
            };
            if !arg.is_empty() {
                return Err(CommandError::UnsupportedArgument {
                    command: name.clone(),
                    arg: arg.to_string(),
                });
            }
            Ok(command)
        }
    }
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn suggest_command(name: &str) -> Option<&'static str> {
    COMMAND_NAMES
        .iter()
        .map(|c| (*c, strsim::jaro_winkler(name, c)))
        .filter(|(_, score)| *score >= 0.85)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Display help for the interactive session
pub fn print_help() {
    println!(
        r#"
Special Commands for the Tutoring Session
=========================================

TUTORS:
  /tutor <id>     - Open the chat with a tutor (generale, scientifica, umanistica)
  /tutors         - List the available tutors

ATTACHMENTS:
  /attach <path>  - Attach an image or a PDF to your next message
  /detach         - Remove the attached file

NAVIGATION:
  /home           - Back to the tutor dashboard
  /back           - Same as /home
  /chat           - Return to the open conversation
  /profile        - Show your profile
  /history        - Show stored conversations
  /open <n>       - Reopen conversation number n from /history
  /settings       - Show client settings

SESSION:
  /status         - Show current tutor, view and attachment
  /help           - Show this help message
  /exit           - Leave the session (also: exit, quit)

NOTES:
  - Commands are case-insensitive
  - Any other text is sent to the active tutor
  - Math written as $...$ or \(...\) is highlighted in replies
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("Spiegami la fotosintesi").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_select_tutor_is_case_insensitive() {
        assert_eq!(
            parse_special_command("/TUTOR Umanistica").unwrap(),
            SpecialCommand::SelectTutor("umanistica".to_string())
        );
    }

    #[test]
    fn test_parse_select_unknown_tutor_suggests() {
        let err = parse_special_command("/tutor scientifca").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnknownTutor {
                id: "scientifca".to_string(),
                suggestion: Some("scientifica"),
            }
        );
        assert!(err.to_string().contains("did you mean 'scientifica'"));
    }

    #[test]
    fn test_parse_tutor_without_argument() {
        assert!(matches!(
            parse_special_command("/tutor"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_attach_keeps_path_case() {
        assert_eq!(
            parse_special_command("/attach ~/Compiti/Esercizio 1.PNG").unwrap(),
            SpecialCommand::Attach(PathBuf::from("~/Compiti/Esercizio 1.PNG"))
        );
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(
            parse_special_command("/back").unwrap(),
            SpecialCommand::Navigate(View::Dashboard)
        );
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::Navigate(View::History)
        );
        assert_eq!(
            parse_special_command("/settings").unwrap(),
            SpecialCommand::Navigate(View::Settings)
        );
        assert_eq!(
            parse_special_command("/chat").unwrap(),
            SpecialCommand::Navigate(View::Chat)
        );
    }

    #[test]
    fn test_parse_open_is_one_based() {
        assert_eq!(
            parse_special_command("/open 2").unwrap(),
            SpecialCommand::OpenHistory(1)
        );
        assert!(matches!(
            parse_special_command("/open 0"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/open due"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_parse_argument_on_bare_command() {
        assert!(matches!(
            parse_special_command("/status now"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_unknown_command_suggestion() {
        let err = parse_special_command("/histroy").unwrap_err();
        match err {
            CommandError::UnknownCommand {
                command,
                suggestion,
            } => {
                assert_eq!(command, "/histroy");
                assert_eq!(suggestion, Some("/history"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            parse_special_command("/xyz"),
            Err(CommandError::UnknownCommand {
                suggestion: None,
                ..
            })
        ));
    }
}
