//! Backend abstraction for NODU
//!
//! The tutoring backend is an opaque collaborator reached through two calls:
//! fetching the stored history and sending a chat message. This module holds
//! the wire types for both and the [`ChatBackend`] trait the session core
//! depends on.

pub mod http;

pub use http::HttpBackend;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `GET /api/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// `"success"` when the history is usable
    #[serde(default)]
    pub status: Option<String>,
    /// Backend key to stored transcript
    #[serde(default)]
    pub history: Option<HashMap<String, WireTranscript>>,
}

impl HistoryResponse {
    /// Transcripts carried by a successful response, `None` otherwise
    pub fn into_transcripts(self) -> Option<HashMap<String, WireTranscript>> {
        match self.status.as_deref() {
            Some("success") => self.history,
            _ => None,
        }
    }
}

/// One stored conversation as the backend serializes it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireTranscript {
    /// Messages in display order
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    /// ISO 8601 timestamp, with or without offset
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One stored message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// `user`, or `assistant`/`bot` for tutor replies
    pub role: String,
    /// Message text (markdown and math permitted)
    #[serde(default)]
    pub content: String,
    /// Optional creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed message text
    pub message: String,
    /// Backend key of the active tutor
    #[serde(rename = "tutorType")]
    pub tutor_type: String,
    /// Data URL of the pending attachment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// MIME type of the pending attachment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ChatRequest {
    /// Whether an attachment travels with this request
    pub fn has_attachment(&self) -> bool {
        self.image_data.is_some()
    }
}

/// Raw body of a chat response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponseBody {
    /// Tutor reply
    #[serde(default)]
    pub reply: Option<String>,
    /// Application-level error description
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponseBody {
    /// Interpret the body; `error` wins over `reply`
    pub fn into_reply(self) -> Option<ChatReply> {
        match (self.error, self.reply) {
            (Some(error), _) => Some(ChatReply::Error(error)),
            (None, Some(reply)) => Some(ChatReply::Reply(reply)),
            (None, None) => None,
        }
    }
}

/// Outcome of a chat call that reached the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Normal tutor reply
    Reply(String),
    /// The backend reported an application error
    Error(String),
}

/// The tutoring backend
///
/// Any `Err` returned here is a transport failure: unreachable server,
/// timeout, or a body that is neither a reply nor an error payload.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Fetch every stored transcript of the current user
    async fn fetch_history(&self) -> Result<HistoryResponse>;

    /// Send one message and wait for the reply
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply>;
}
