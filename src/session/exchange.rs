//! Message exchange pipeline
//!
//! One `send` is: optimistic echo of the user message, a transient
//! placeholder, exactly one backend call, then the placeholder is replaced by
//! the reply, an error-marked reply, or a fixed connectivity error.
//!
//! The pipeline is split in two halves so an event loop can dispatch the
//! network call itself: [`ChatSession::begin_send`] does everything up to the
//! request, [`ChatSession::complete_send`] consumes the outcome. While a
//! request is in flight further sends are rejected.

use crate::backend::{ChatReply, ChatRequest};
use crate::error::Result;
use crate::session::message::{Message, MessageHandle};
use crate::session::render::RenderCommand;
use crate::session::ChatSession;
use crate::tutors;

/// Content of the "awaiting reply" placeholder
pub const PLACEHOLDER_TEXT: &str = "...";

/// Prefix of application errors rendered in the chat
pub const ERROR_PREFIX: &str = "Errore: ";

/// Message rendered on transport failure
pub const CONNECTION_ERROR_TEXT: &str = "Errore di connessione con il server. Riprova.";

/// Notice shown when a send is attempted while another is in flight
pub const BUSY_NOTICE: &str = "Please wait for the tutor to answer before sending again.";

/// An exchange whose request is ready to dispatch
#[derive(Debug, Clone)]
pub struct PendingExchange {
    /// Request body for `POST /api/chat`
    pub request: ChatRequest,
    placeholder: MessageHandle,
    user_message: Message,
}

/// Result of [`ChatSession::begin_send`]
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Echo and placeholder are rendered; dispatch the request
    Ready(PendingExchange),
    /// Nothing to send after trimming
    Ignored,
    /// Another exchange is in flight
    Busy,
}

/// How a send ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input, nothing happened
    Ignored,
    /// Rejected because another exchange is in flight
    Busy,
    /// A normal reply was rendered
    Replied,
    /// The backend reported an application error
    ApplicationError,
    /// The backend could not be reached or answered garbage
    TransportError,
}

impl ChatSession {
    /// Send one message and render the outcome
    pub async fn send(&mut self, raw_text: &str) -> SendOutcome {
        let exchange = match self.begin_send(raw_text) {
            Dispatch::Ready(exchange) => exchange,
            Dispatch::Ignored => return SendOutcome::Ignored,
            Dispatch::Busy => return SendOutcome::Busy,
        };

        let backend = self.backend.clone();
        let result = backend.send_message(&exchange.request).await;
        self.complete_send(exchange, result)
    }

    /// Echo the message, render the placeholder and assemble the request
    pub fn begin_send(&mut self, raw_text: &str) -> Dispatch {
        let text = raw_text.trim();
        if text.is_empty() {
            return Dispatch::Ignored;
        }
        if self.in_flight {
            tracing::debug!("Rejecting send while another exchange is in flight");
            self.emit(RenderCommand::Notice(BUSY_NOTICE.to_string()));
            return Dispatch::Busy;
        }

        let user_message = Message::user(text);
        self.render_message(user_message.clone(), false);
        let placeholder = self.render_message(Message::assistant(PLACEHOLDER_TEXT), true);

        let tutor_type = self
            .active_tutor
            .map(|t| t.descriptor().backend_key)
            .unwrap_or(tutors::DEFAULT_BACKEND_KEY)
            .to_string();
        let attachment = self.attachments.pending();
        let request = ChatRequest {
            message: text.to_string(),
            tutor_type,
            image_data: attachment.map(|a| a.payload.clone()),
            mime_type: attachment.map(|a| a.mime_type.clone()),
        };

        self.in_flight = true;
        Dispatch::Ready(PendingExchange {
            request,
            placeholder,
            user_message,
        })
    }

    /// Replace the placeholder with the outcome of the backend call
    ///
    /// On transport failure the pending attachment is kept so the user can
    /// retry without picking the file again.
    pub fn complete_send(
        &mut self,
        exchange: PendingExchange,
        result: Result<ChatReply>,
    ) -> SendOutcome {
        self.in_flight = false;
        self.remove_message(exchange.placeholder);

        match result {
            Ok(ChatReply::Reply(reply)) => {
                let reply_message = Message::assistant(reply);
                self.render_message(reply_message.clone(), false);
                self.persist_exchange(
                    &exchange.request.tutor_type,
                    exchange.user_message,
                    reply_message,
                );
                self.clear_sent_attachment(&exchange.request);
                SendOutcome::Replied
            }
            Ok(ChatReply::Error(error)) => {
                tracing::warn!("Backend reported an error: {}", error);
                let marked = Message::assistant(format!("{}{}", ERROR_PREFIX, error));
                self.render_message(marked, false);
                self.clear_sent_attachment(&exchange.request);
                SendOutcome::ApplicationError
            }
            Err(e) => {
                tracing::error!("Connection error: {}", e);
                self.render_message(Message::assistant(CONNECTION_ERROR_TEXT), false);
                SendOutcome::TransportError
            }
        }
    }

    fn clear_sent_attachment(&mut self, request: &ChatRequest) {
        if request.has_attachment() {
            let command = self.attachments.clear();
            self.emit(command);
        }
    }

    /// Record a completed exchange in the local history cache
    fn persist_exchange(&mut self, backend_key: &str, user: Message, reply: Message) {
        let seed = match self.pending_seed.take() {
            Some((key, greeting)) if key == backend_key => Some(greeting),
            other => {
                self.pending_seed = other;
                None
            }
        };
        self.history
            .append(backend_key, seed.into_iter().chain([user, reply]));
    }
}
