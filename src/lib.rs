//! NODU - tutoring chat client library
//!
//! This library provides the client side of the NODU tutoring chat: the
//! session state machine that drives view navigation, tutor selection,
//! history replay, attachments and the message exchange with the backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat session manager, view navigator, history store,
//!   attachment buffer and message exchange pipeline
//! - `tutors`: Static tutor registry and wire key mapping
//! - `backend`: Backend contract and its HTTP implementation
//! - `terminal`: Terminal presentation adapter
//! - `commands`: CLI command handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use nodu::backend::HttpBackend;
//! use nodu::terminal::TerminalPresenter;
//! use nodu::{ChatSession, Config};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/nodu.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.server)?);
//!     let presenter = Box::new(TerminalPresenter::stdout(&config));
//!     let mut session = ChatSession::new(backend, presenter, &config);
//!     session.start().await;
//!     session.select_tutor("generale");
//!     session.send("Ciao!").await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod terminal;
pub mod tutors;

// Re-export commonly used types
pub use backend::{ChatBackend, HttpBackend};
pub use config::Config;
pub use error::{AttachmentError, NoduError, Result};
pub use session::{ChatSession, RenderCommand, SendOutcome, UiEvent, View};
pub use tutors::TutorId;

#[cfg(test)]
pub mod test_utils;
