//! View navigator
//!
//! Finite state machine over the client's views. Exactly one view is
//! visible at a time; every view is reachable from every other.

use crate::session::render::RenderCommand;
use std::fmt;
use std::time::Duration;

/// Named views of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Tutor cards
    Dashboard,
    /// Conversation with the active tutor
    Chat,
    /// Student profile
    Profile,
    /// Stored conversations
    History,
    /// Client settings
    Settings,
}

impl View {
    /// Every view, dashboard first
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Chat,
        View::Profile,
        View::History,
        View::Settings,
    ];

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Chat => "chat",
            Self::Profile => "profile",
            Self::History => "history",
            Self::Settings => "settings",
        }
    }

    /// Parse a view name; anything outside the state set is rejected
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dashboard" | "home" => Some(Self::Dashboard),
            "chat" => Some(Self::Chat),
            "profile" => Some(Self::Profile),
            "history" => Some(Self::History),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }

    /// Navigation affordance that represents this view (chat has none)
    pub fn nav_entry(&self) -> Option<View> {
        match self {
            Self::Chat => None,
            other => Some(*other),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and switches the visible view
#[derive(Debug, Clone)]
pub struct ViewNavigator {
    current: View,
    settle_delay: Duration,
}

impl ViewNavigator {
    /// Starts on the dashboard
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            current: View::Dashboard,
            settle_delay,
        }
    }

    /// Currently visible view
    pub fn current(&self) -> View {
        self.current
    }

    /// Whether `view` is the visible one
    pub fn is_visible(&self, view: View) -> bool {
        self.current == view
    }

    /// Switch to `target` and return the instructions that make it so
    ///
    /// Re-entrant: navigating to the current view re-emits the same
    /// instructions. Rendering the history view's content is the caller's job.
    pub fn navigate(&mut self, target: View) -> Vec<RenderCommand> {
        tracing::debug!("Navigating {} -> {}", self.current, target);
        self.current = target;

        let mut commands = vec![RenderCommand::ShowView {
            view: target,
            active_nav: target.nav_entry(),
        }];
        if target == View::Chat {
            commands.push(RenderCommand::FocusInput {
                after: self.settle_delay,
            });
        }
        commands
    }
}
