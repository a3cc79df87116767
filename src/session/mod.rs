//! Chat session and view state machine
//!
//! [`ChatSession`] owns all mutable client state: the visible view, the
//! active tutor, the rendered chat surface, the history cache and the
//! pending attachment. Input arrives as [`UiEvent`]s (or the equivalent
//! methods); output leaves as [`RenderCommand`]s handed to a [`Presenter`].
//!
//! # Example
//!
//! ```no_run
//! use nodu::backend::HttpBackend;
//! use nodu::config::Config;
//! use nodu::session::{ChatSession, UiEvent};
//! # use nodu::session::render::{Presenter, RenderCommand};
//! # struct Stdout;
//! # impl Presenter for Stdout { fn apply(&mut self, c: RenderCommand) { println!("{:?}", c) } }
//! use std::sync::Arc;
//!
//! # async fn example() -> nodu::Result<()> {
//! let config = Config::default();
//! let backend = Arc::new(HttpBackend::new(&config.server)?);
//! let mut session = ChatSession::new(backend, Box::new(Stdout), &config);
//! session.start().await;
//! session.dispatch(UiEvent::TutorSelected("scientifica".into())).await;
//! session.dispatch(UiEvent::SendRequested("Cos'è un integrale?".into())).await;
//! # Ok(())
//! # }
//! ```

pub mod attachment;
pub mod exchange;
pub mod history;
pub mod message;
pub mod render;
pub mod view;

pub use attachment::{AttachmentBuffer, MediaKind, PendingAttachment, SelectedFile};
pub use exchange::{Dispatch, PendingExchange, SendOutcome};
pub use history::{HistoryEntry, HistoryStore, Transcript};
pub use message::{ChatSurface, Message, MessageHandle, RenderedMessage, Role};
pub use render::{MarkupRenderer, PlainMarkup, Presenter, RenderCommand, Typesetter};
pub use view::{View, ViewNavigator};

use crate::backend::ChatBackend;
use crate::config::Config;
use crate::tutors::{self, TutorId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Input events from the presentation layer
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A tutor card (or history row) was chosen, by frontend id
    TutorSelected(String),
    /// The user submitted the input box
    SendRequested(String),
    /// A file was picked in memory
    AttachmentChosen(SelectedFile),
    /// A file was picked by path
    AttachmentPathChosen(PathBuf),
    /// The preview's remove button was pressed
    AttachmentRemoved,
    /// A navigation entry was pressed
    Navigate(View),
    /// The chat header's back button was pressed
    BackToDashboard,
    /// The n-th row (zero-based) of the history view was chosen
    HistoryEntryChosen(usize),
}

/// The (active tutor, visible view) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Tutor bound to the chat pane
    pub tutor: Option<TutorId>,
    /// Visible view
    pub view: View,
}

/// Owned session context driving the whole client
pub struct ChatSession {
    navigator: ViewNavigator,
    history: HistoryStore,
    attachments: AttachmentBuffer,
    surface: ChatSurface,
    active_tutor: Option<TutorId>,
    backend: Arc<dyn ChatBackend>,
    presenter: Box<dyn Presenter>,
    markup: Box<dyn MarkupRenderer>,
    typesetter: Option<Arc<dyn Typesetter>>,
    settle_delay: Duration,
    in_flight: bool,
    /// Greeting shown for a tutor with no transcript, persisted on first send
    pending_seed: Option<(String, Message)>,
}

impl ChatSession {
    /// Create a session on the dashboard with an empty, unloaded history
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        presenter: Box<dyn Presenter>,
        config: &Config,
    ) -> Self {
        let settle_delay = Duration::from_millis(config.chat.settle_delay_ms);
        Self {
            navigator: ViewNavigator::new(settle_delay),
            history: HistoryStore::new(),
            attachments: AttachmentBuffer::new(config.attachments.clone()),
            surface: ChatSurface::new(),
            active_tutor: None,
            backend,
            presenter,
            markup: Box::new(PlainMarkup),
            typesetter: None,
            settle_delay,
            in_flight: false,
            pending_seed: None,
        }
    }

    /// Use a markup renderer for message text
    pub fn with_markup(mut self, markup: Box<dyn MarkupRenderer>) -> Self {
        self.markup = markup;
        self
    }

    /// Run a math typesetting pass after each rendered message
    pub fn with_typesetter(mut self, typesetter: Arc<dyn Typesetter>) -> Self {
        self.typesetter = Some(typesetter);
        self
    }

    /// Load the history cache (once) and show the dashboard
    pub async fn start(&mut self) {
        self.history.load(self.backend.as_ref()).await;
        self.navigate(View::Dashboard);
    }

    /// Current (tutor, view) pair
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            tutor: self.active_tutor,
            view: self.navigator.current(),
        }
    }

    /// Messages currently on the chat surface
    pub fn surface(&self) -> &[RenderedMessage] {
        self.surface.entries()
    }

    /// The history cache
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The staged attachment, if any
    pub fn pending_attachment(&self) -> Option<&PendingAttachment> {
        self.attachments.pending()
    }

    /// Whether a message exchange is awaiting its reply
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Route one UI event to its operation
    pub async fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::TutorSelected(id) => {
                self.select_tutor(&id);
            }
            UiEvent::SendRequested(text) => {
                self.send(&text).await;
            }
            UiEvent::AttachmentChosen(file) => self.stage_attachment(file),
            UiEvent::AttachmentPathChosen(path) => self.stage_attachment_path(&path).await,
            UiEvent::AttachmentRemoved => self.remove_attachment(),
            UiEvent::Navigate(view) => self.navigate(view),
            UiEvent::BackToDashboard => self.navigate(View::Dashboard),
            UiEvent::HistoryEntryChosen(index) => {
                self.open_history_entry(index);
            }
        }
    }

    /// Bind a tutor, rebuild the chat pane from history and show it
    ///
    /// Unknown ids are absorbed: nothing is rendered and the view does not
    /// change. Selecting the active tutor again re-runs the whole sequence.
    /// Returns whether the tutor was selected.
    pub fn select_tutor(&mut self, frontend_id: &str) -> bool {
        let Some(descriptor) = tutors::lookup(frontend_id) else {
            tracing::debug!("Ignoring selection of unknown tutor '{}'", frontend_id);
            return false;
        };
        tracing::info!("Selected tutor {}", descriptor.id);

        self.active_tutor = Some(descriptor.id);
        self.emit(RenderCommand::SetChatHeader {
            tutor: descriptor.id,
            name: descriptor.display_name,
            theme: descriptor.visual_theme,
        });

        self.surface.clear();
        self.pending_seed = None;
        self.emit(RenderCommand::ClearChat);

        let backend_key = tutors::to_backend_key(frontend_id);
        let replay: Vec<Message> = self
            .history
            .get(backend_key)
            .map(|t| t.messages.clone())
            .unwrap_or_default();

        if replay.is_empty() {
            let greeting = Message::assistant(descriptor.greeting_text);
            self.pending_seed = Some((backend_key.to_string(), greeting.clone()));
            self.render_message(greeting, false);
        } else {
            tracing::debug!("Replaying {} stored messages", replay.len());
            for message in replay {
                self.render_message(message, false);
            }
        }

        self.navigate(View::Chat);
        self.emit(RenderCommand::AcknowledgeSelection(descriptor.id));
        true
    }

    /// Show a view; the history view is populated from the cache
    pub fn navigate(&mut self, target: View) {
        for command in self.navigator.navigate(target) {
            self.emit(command);
        }
        if target == View::History {
            let overview = self.history.overview();
            self.emit(RenderCommand::ShowHistory(overview));
        }
    }

    /// Select the tutor behind the n-th history row
    pub fn open_history_entry(&mut self, index: usize) -> bool {
        match self.history.overview().get(index) {
            Some(entry) => {
                let id = entry.tutor.as_str();
                self.select_tutor(id)
            }
            None => {
                self.emit(RenderCommand::Notice(format!(
                    "No history entry number {}",
                    index + 1
                )));
                false
            }
        }
    }

    /// Stage an in-memory file as the pending attachment
    pub fn stage_attachment(&mut self, file: SelectedFile) {
        match self.attachments.stage(file) {
            Ok(preview) => self.emit(preview),
            Err(e) => self.emit(RenderCommand::Notice(e.to_string())),
        }
    }

    /// Stage a file from disk as the pending attachment
    pub async fn stage_attachment_path(&mut self, path: &std::path::Path) {
        match self.attachments.stage_path(path).await {
            Ok(preview) => self.emit(preview),
            Err(e) => {
                if self.attachments.pending().is_none() {
                    self.emit(RenderCommand::HidePreviews);
                }
                self.emit(RenderCommand::Notice(e.to_string()));
            }
        }
    }

    /// Drop the pending attachment and hide its preview
    pub fn remove_attachment(&mut self) {
        let command = self.attachments.clear();
        self.emit(command);
    }

    fn emit(&mut self, command: RenderCommand) {
        tracing::trace!("Render: {:?}", command);
        self.presenter.apply(command);
    }

    /// Append a message to the surface and render it
    fn render_message(&mut self, message: Message, placeholder: bool) -> MessageHandle {
        let role = message.role;
        let markup = if placeholder {
            message.content.clone()
        } else {
            self.markup.render(&message.content)
        };
        let handle = self.surface.push(message, placeholder);
        let tutor = match role {
            Role::Assistant => self.active_tutor,
            Role::User => None,
        };

        self.emit(RenderCommand::AppendMessage {
            handle,
            role,
            markup: markup.clone(),
            tutor,
        });
        if !placeholder {
            if let Some(typesetter) = &self.typesetter {
                render::spawn_typeset(typesetter.clone(), markup);
            }
        }
        self.emit(RenderCommand::ScrollToEnd {
            after: self.settle_delay,
        });
        handle
    }

    fn remove_message(&mut self, handle: MessageHandle) {
        if !self.surface.remove(handle) {
            tracing::debug!("Message {:?} no longer on the surface", handle);
        }
        self.emit(RenderCommand::RemoveMessage(handle));
    }
}
