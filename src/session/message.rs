//! Chat messages and the local chat surface
//!
//! Messages are immutable once created. The chat surface is the ordered list
//! of messages currently rendered in the chat pane, each tagged with the
//! handle the presenter uses to address it.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The student
    User,
    /// The tutor
    Assistant,
}

impl Role {
    /// Parse a stored role; the backend persists tutor replies as `bot`
    ///
    /// Unrecognized roles are treated as tutor replies.
    pub fn from_wire(role: &str) -> Self {
        match role {
            "user" => Self::User,
            "assistant" | "bot" => Self::Assistant,
            other => {
                tracing::debug!("Unknown stored role '{}', treating as assistant", other);
                Self::Assistant
            }
        }
    }

    /// Wire name of this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author
    pub role: Role,
    /// Renderable text (markdown and math permitted)
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a student message stamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a tutor message stamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a message stamped now
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 and the offset-less ISO 8601 form the backend emits
/// (`2025-01-02T10:00:01.123456`), which is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Presenter-facing address of a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHandle(pub u64);

/// A message as currently shown on the chat surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Render handle
    pub handle: MessageHandle,
    /// The message
    pub message: Message,
    /// True for the transient "awaiting reply" entry
    pub placeholder: bool,
}

/// Local render state of the chat pane
///
/// Append-only apart from clearing and placeholder removal.
#[derive(Debug, Default)]
pub struct ChatSurface {
    entries: Vec<RenderedMessage>,
    next_handle: u64,
}

impl ChatSurface {
    /// Creates an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its handle
    pub fn push(&mut self, message: Message, placeholder: bool) -> MessageHandle {
        let handle = MessageHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(RenderedMessage {
            handle,
            message,
            placeholder,
        });
        handle
    }

    /// Removes the entry with this handle; false if it is no longer shown
    pub fn remove(&mut self, handle: MessageHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drops every rendered entry; handles keep increasing
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in display order
    pub fn entries(&self) -> &[RenderedMessage] {
        &self.entries
    }

    /// Number of rendered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is rendered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
