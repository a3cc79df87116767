//! Render instructions and presentation collaborators
//!
//! The session core never touches a presentation tree. It emits
//! [`RenderCommand`]s that a thin adapter implementing [`Presenter`]
//! executes, and it hands message text to a [`MarkupRenderer`] before
//! rendering. Math typesetting is an optional best-effort pass.

use crate::error::Result;
use crate::session::history::HistoryEntry;
use crate::session::message::{MessageHandle, Role};
use crate::session::view::View;
use crate::tutors::{TutorId, VisualTheme};
use std::sync::Arc;
use std::time::Duration;

/// One instruction for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Make `view` the only visible view and mark `active_nav` as the active
    /// navigation affordance (none for the chat view)
    ShowView {
        /// View to show
        view: View,
        /// Navigation entry to highlight
        active_nav: Option<View>,
    },
    /// Request input focus once layout settles
    FocusInput {
        /// Settle delay
        after: Duration,
    },
    /// Update the chat header for the selected tutor
    SetChatHeader {
        /// Tutor shown
        tutor: TutorId,
        /// Display name
        name: &'static str,
        /// Styling handle
        theme: VisualTheme,
    },
    /// Remove every message from the chat pane
    ClearChat,
    /// Append a message to the chat pane
    AppendMessage {
        /// Handle for later removal
        handle: MessageHandle,
        /// Author
        role: Role,
        /// Output of the markup renderer
        markup: String,
        /// Tutor whose avatar accompanies assistant messages
        tutor: Option<TutorId>,
    },
    /// Remove a previously appended message; no-op if already gone
    RemoveMessage(MessageHandle),
    /// Scroll the chat pane to its end once rendering settles
    ScrollToEnd {
        /// Settle delay
        after: Duration,
    },
    /// Show the visual preview of a staged image
    ShowImagePreview {
        /// Original file name
        name: String,
        /// MIME type
        mime_type: String,
    },
    /// Show the named-file chip of a staged document
    ShowDocumentChip {
        /// Original file name
        name: String,
    },
    /// Hide both preview modes
    HidePreviews,
    /// Immediate user-facing notice (validation failures, busy sends)
    Notice(String),
    /// Populate the history view
    ShowHistory(Vec<HistoryEntry>),
    /// Cosmetic acknowledgement on the selected tutor's card
    AcknowledgeSelection(TutorId),
}

/// Executes render instructions against some presentation surface
pub trait Presenter: Send {
    /// Apply one instruction
    fn apply(&mut self, command: RenderCommand);
}

/// Turns message text into presentable markup
pub trait MarkupRenderer: Send + Sync {
    /// Render markdown/math text
    fn render(&self, text: &str) -> String;
}

/// Markup renderer that passes text through untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainMarkup;

impl MarkupRenderer for PlainMarkup {
    fn render(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Post-render math pass
///
/// Failures are logged and never reach the user.
pub trait Typesetter: Send + Sync {
    /// Typeset the math in a rendered fragment
    fn typeset(&self, fragment: &str) -> Result<()>;
}

/// Run the typesetter on a detached task, swallowing failures
///
/// Outside a Tokio runtime the pass is skipped.
pub fn spawn_typeset(typesetter: Arc<dyn Typesetter>, fragment: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = typesetter.typeset(&fragment) {
                    tracing::warn!("Math typesetting failed: {}", e);
                }
            });
        }
        Err(_) => tracing::trace!("No runtime available, skipping math typesetting"),
    }
}
