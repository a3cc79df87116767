//! Test utilities for NODU
//!
//! Provides an in-memory backend with scripted replies, a presenter that
//! records every render instruction, and configuration helpers.

use crate::backend::{ChatBackend, ChatReply, ChatRequest, HistoryResponse, WireTranscript};
use crate::config::Config;
use crate::error::{NoduError, Result};
use crate::session::message::Role;
use crate::session::render::{Presenter, RenderCommand};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Configuration used across unit tests
///
/// Points at an unroutable local address and uses no settle delay.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.base_url = "http://127.0.0.1:9".to_string();
    config.server.timeout_seconds = 5;
    config.chat.settle_delay_ms = 0;
    config
}

/// YAML equivalent of [`test_config`]
pub fn test_config_yaml() -> String {
    r#"
server:
  base_url: "http://127.0.0.1:9"
  timeout_seconds: 5
chat:
  settle_delay_ms: 0
"#
    .to_string()
}

/// Presenter that records every instruction it receives
///
/// Clones share the same log, so a test keeps one clone and hands the other
/// to the session.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    log: Arc<Mutex<Vec<RenderCommand>>>,
}

impl RecordingPresenter {
    /// Creates a presenter with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Every instruction so far, in order
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.log.lock().expect("presenter log poisoned").clone()
    }

    /// Role and markup of every appended message, in order
    pub fn appended(&self) -> Vec<(Role, String)> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                RenderCommand::AppendMessage { role, markup, .. } => Some((role, markup)),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn apply(&mut self, command: RenderCommand) {
        self.log.lock().expect("presenter log poisoned").push(command);
    }
}

/// One scripted answer to `send_message`
#[derive(Debug, Clone)]
enum ScriptedReply {
    Reply(String),
    Error(String),
    TransportFailure,
}

/// In-memory backend answering from a script
///
/// Chat replies are consumed in order; once the script runs out every send
/// fails as a transport error.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    history: Option<HashMap<String, WireTranscript>>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ChatRequest>>,
    history_fetches: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend with no history and no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `history` from `fetch_history`
    pub fn with_history(mut self, history: HashMap<String, WireTranscript>) -> Self {
        self.history = Some(history);
        self
    }

    /// Queue a normal reply
    pub fn with_reply(self, reply: &str) -> Self {
        self.push(ScriptedReply::Reply(reply.to_string()))
    }

    /// Queue an application error
    pub fn with_error(self, error: &str) -> Self {
        self.push(ScriptedReply::Error(error.to_string()))
    }

    /// Queue a transport failure
    pub fn with_transport_failure(self) -> Self {
        self.push(ScriptedReply::TransportFailure)
    }

    /// Requests received by `send_message`, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Number of `fetch_history` calls
    pub fn history_fetches(&self) -> usize {
        self.history_fetches.load(Ordering::SeqCst)
    }

    fn push(self, reply: ScriptedReply) -> Self {
        self.replies
            .lock()
            .expect("reply script poisoned")
            .push_back(reply);
        self
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn fetch_history(&self) -> Result<HistoryResponse> {
        self.history_fetches.fetch_add(1, Ordering::SeqCst);
        match &self.history {
            Some(history) => Ok(HistoryResponse {
                status: Some("success".to_string()),
                history: Some(history.clone()),
            }),
            None => Err(NoduError::Backend("no history scripted".to_string()).into()),
        }
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        let next = self
            .replies
            .lock()
            .expect("reply script poisoned")
            .pop_front();
        match next {
            Some(ScriptedReply::Reply(text)) => Ok(ChatReply::Reply(text)),
            Some(ScriptedReply::Error(text)) => Ok(ChatReply::Error(text)),
            Some(ScriptedReply::TransportFailure) | None => {
                Err(NoduError::Backend("connection refused".to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_backend_consumes_replies_in_order() {
        let backend = ScriptedBackend::new().with_reply("a").with_error("b");
        let request = ChatRequest {
            message: "x".to_string(),
            tutor_type: "tutor-general".to_string(),
            image_data: None,
            mime_type: None,
        };
        assert_eq!(
            backend.send_message(&request).await.unwrap(),
            ChatReply::Reply("a".to_string())
        );
        assert_eq!(
            backend.send_message(&request).await.unwrap(),
            ChatReply::Error("b".to_string())
        );
        assert!(backend.send_message(&request).await.is_err());
        assert_eq!(backend.requests().len(), 3);
    }

    #[test]
    fn test_config_yaml_matches_test_config() {
        let parsed: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        let expected = test_config();
        assert_eq!(parsed.server.base_url, expected.server.base_url);
        assert_eq!(parsed.chat.settle_delay_ms, expected.chat.settle_delay_ms);
    }
}
