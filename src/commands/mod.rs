/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`:    Interactive tutoring session
- `tutors`:  List the registered tutors
- `history`: Show the conversation history stored on the backend
*/

use crate::backend::HttpBackend;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::session::{ChatSession, SessionIdentity, UiEvent, View};
use crate::terminal::{MathTypesetter, TerminalMarkup, TerminalPresenter};
use std::sync::Arc;

// Special commands parser for the interactive session
pub mod special_commands;

// Tutor listing
pub mod tutors;

// History listing
pub mod history;

// Chat command handler
pub mod chat {
    //! Interactive tutoring session handler.
    //!
    //! Wires the HTTP backend and the terminal presenter into a
    //! [`ChatSession`] and runs a readline loop that turns each line into a
    //! session event.

    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive tutoring session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `tutor` - Tutor to open immediately, overriding `chat.default_tutor`
    ///
    /// # Examples
    ///
    /// ```
    /// use nodu::commands::chat;
    /// use nodu::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), Some("scientifica".to_string())).await?;
    /// ```
    pub async fn run_chat(config: Config, tutor: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive tutoring session");

        let backend = Arc::new(HttpBackend::new(&config.server)?);
        let presenter = TerminalPresenter::stdout(&config);
        let mut session = ChatSession::new(backend, Box::new(presenter), &config)
            .with_markup(Box::new(TerminalMarkup::new()?))
            .with_typesetter(Arc::new(MathTypesetter));

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);
        session.start().await;

        if let Some(id) = tutor.or_else(|| config.chat.default_tutor.clone()) {
            if !session.select_tutor(&id.to_lowercase()) {
                let warning = format!("Unknown tutor '{}', staying on the dashboard", id);
                eprintln!("{}", warning.yellow());
            }
        }

        loop {
            let prompt = format_prompt(session.identity());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::SelectTutor(id) => {
                            session.dispatch(UiEvent::TutorSelected(id)).await;
                        }
                        SpecialCommand::ListTutors => tutors::list_tutors(false)?,
                        SpecialCommand::Attach(path) => {
                            session.dispatch(UiEvent::AttachmentPathChosen(path)).await;
                        }
                        SpecialCommand::Detach => {
                            session.dispatch(UiEvent::AttachmentRemoved).await;
                            println!("Attachment removed\n");
                        }
                        SpecialCommand::Navigate(View::Dashboard) => {
                            session.dispatch(UiEvent::BackToDashboard).await;
                        }
                        SpecialCommand::Navigate(View::Chat)
                            if session.identity().tutor.is_none() =>
                        {
                            println!("{}", "Choose a tutor first with /tutor <id>\n".yellow());
                        }
                        SpecialCommand::Navigate(view) => {
                            session.dispatch(UiEvent::Navigate(view)).await;
                        }
                        SpecialCommand::OpenHistory(index) => {
                            session.dispatch(UiEvent::HistoryEntryChosen(index)).await;
                        }
                        SpecialCommand::ShowStatus => print_status_display(&session, &config),
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            rl.add_history_entry(trimmed)?;
                            if session.identity().view != View::Chat {
                                let hint = "Open a conversation with /tutor <id> (or /chat) \
                                            before writing\n";
                                println!("{}", hint.yellow());
                                continue;
                            }
                            session
                                .dispatch(UiEvent::SendRequested(trimmed.to_string()))
                                .await;
                            println!();
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Arrivederci!");
        Ok(())
    }

    /// Prompt showing the active tutor while chatting
    pub(crate) fn format_prompt(identity: SessionIdentity) -> String {
        match (identity.view, identity.tutor) {
            (View::Chat, Some(tutor)) => {
                format!("[{}] >>> ", tutor.descriptor().visual_theme.icon)
                    .green()
                    .to_string()
            }
            (view, _) => format!("[{}] >>> ", view).dimmed().to_string(),
        }
    }

    /// Display welcome banner at the start of the session
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              NODU Tutoring Session - Benvenuto!              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Server:  {}", config.server.base_url.cyan());
        println!("Student: {}\n", config.chat.user_name);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    ///
    /// Called when the user types '/status'.
    fn print_status_display(session: &ChatSession, config: &Config) {
        let identity = session.identity();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     NODU Session Status                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Tutor:             {}",
            identity
                .tutor
                .map(|t| t.descriptor().display_name.cyan().to_string())
                .unwrap_or_else(|| "none".dimmed().to_string())
        );
        println!("View:              {}", identity.view);
        println!("Conversation Size: {} messages", session.surface().len());
        println!("Stored Histories:  {}", session.history().len());
        println!(
            "Attachment:        {}",
            session
                .pending_attachment()
                .map(|a| format!("{} ({})", a.original_name, a.mime_type))
                .unwrap_or_else(|| "none".to_string())
        );
        println!("Server:            {}", config.server.base_url);
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::tutors::TutorId;

        #[test]
        fn test_prompt_shows_tutor_only_in_chat() {
            let chatting = format_prompt(SessionIdentity {
                tutor: Some(TutorId::Scientifica),
                view: View::Chat,
            });
            assert!(chatting.contains("[TS] >>> "));

            let browsing = format_prompt(SessionIdentity {
                tutor: Some(TutorId::Scientifica),
                view: View::History,
            });
            assert!(browsing.contains("[history] >>> "));
        }

        #[test]
        fn test_print_welcome_banner_does_not_panic() {
            print_welcome_banner(&Config::default());
        }
    }
}
