//! History store
//!
//! Process-wide cache of per-tutor transcripts keyed by backend key. It is
//! filled at most once from the backend and afterwards only read, plus
//! extended locally as conversations progress.

use crate::backend::{ChatBackend, WireTranscript};
use crate::session::message::{parse_timestamp, Message, Role};
use crate::tutors::{self, TutorId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Ordered conversation with one tutor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Messages in display order
    pub messages: Vec<Message>,
    /// When the conversation last changed
    pub last_updated: Option<DateTime<Utc>>,
}

impl Transcript {
    fn from_wire(wire: WireTranscript) -> Self {
        let last_updated = wire.last_updated.as_deref().and_then(parse_timestamp);
        let fallback = last_updated.unwrap_or_else(Utc::now);
        let messages = wire
            .messages
            .into_iter()
            .map(|m| Message {
                role: Role::from_wire(&m.role),
                created_at: m
                    .timestamp
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or(fallback),
                content: m.content,
            })
            .collect();
        Self {
            messages,
            last_updated,
        }
    }
}

/// Row of the history view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Wire key of the transcript
    pub backend_key: String,
    /// Tutor the entry opens
    pub tutor: TutorId,
    /// Tutor display name
    pub display_name: &'static str,
    /// Avatar initials
    pub icon: &'static str,
    /// Number of stored messages
    pub message_count: usize,
    /// Last change, if known
    pub last_updated: Option<DateTime<Utc>>,
}

/// Cached transcripts
#[derive(Debug, Default)]
pub struct HistoryStore {
    transcripts: HashMap<String, Transcript>,
    loaded: bool,
}

impl HistoryStore {
    /// Creates an empty, not yet loaded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the cache from the backend
    ///
    /// Runs the fetch at most once per store; later calls return without
    /// touching the network. A failed fetch or a non-success status leaves
    /// the cache empty, since a fresh session is valid. Returns the number
    /// of cached transcripts.
    pub async fn load(&mut self, backend: &dyn ChatBackend) -> usize {
        if self.loaded {
            tracing::debug!("History already loaded, skipping fetch");
            return self.transcripts.len();
        }
        self.loaded = true;

        match backend.fetch_history().await {
            Ok(response) => match response.into_transcripts() {
                Some(wire) => {
                    self.replace_all(wire);
                    tracing::info!("Loaded history for {} tutors", self.transcripts.len());
                }
                None => tracing::info!("Backend returned no usable history"),
            },
            Err(e) => tracing::warn!("Failed to load chat history: {}", e),
        }

        self.transcripts.len()
    }

    /// Replace the whole cache
    pub fn replace_all(&mut self, wire: HashMap<String, WireTranscript>) {
        self.transcripts = wire
            .into_iter()
            .map(|(key, transcript)| (key, Transcript::from_wire(transcript)))
            .collect();
    }

    /// Cached transcript for a backend key
    pub fn get(&self, backend_key: &str) -> Option<&Transcript> {
        self.transcripts.get(backend_key)
    }

    /// Append messages to a transcript, creating it if absent
    pub fn append(&mut self, backend_key: &str, messages: impl IntoIterator<Item = Message>) {
        let transcript = self
            .transcripts
            .entry(backend_key.to_string())
            .or_default();
        transcript.messages.extend(messages);
        transcript.last_updated = Some(Utc::now());
    }

    /// Whether [`HistoryStore::load`] has run
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of cached transcripts
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Rows for the history view, most recently updated first
    pub fn overview(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .transcripts
            .iter()
            .map(|(key, transcript)| {
                let tutor = tutors::from_backend_key(key);
                let descriptor = tutor.descriptor();
                HistoryEntry {
                    backend_key: key.clone(),
                    tutor,
                    display_name: descriptor.display_name,
                    icon: descriptor.visual_theme.icon,
                    message_count: transcript.messages.len(),
                    last_updated: transcript.last_updated,
                }
            })
            .collect();
        entries.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| a.backend_key.cmp(&b.backend_key))
        });
        entries
    }
}
