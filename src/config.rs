//! Configuration management for NODU
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{NoduError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for NODU
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat session behavior
    #[serde(default)]
    pub chat: ChatConfig,
    /// Attachment validation bounds
    #[serde(default)]
    pub attachments: AttachmentConfig,
}

/// Backend server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the tutoring backend (e.g. `http://localhost:5000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single backend call (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Raw `Cookie` header value of a logged-in backend session
    ///
    /// History is only served to authenticated sessions; without it the
    /// client starts with an empty history cache.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            session_cookie: None,
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Tutor selected when the chat starts (frontend id); none starts on the dashboard
    #[serde(default)]
    pub default_tutor: Option<String>,

    /// Name shown for the student's own messages
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Delay before focus and scroll requests are executed (milliseconds)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_user_name() -> String {
    "Studente".to_string()
}

fn default_settle_delay() -> u64 {
    100
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_tutor: None,
            user_name: default_user_name(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

/// Attachment validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Maximum image size (bytes)
    #[serde(default = "default_max_image")]
    pub max_image_bytes: u64,

    /// Maximum document size (bytes)
    #[serde(default = "default_max_document")]
    pub max_document_bytes: u64,

    /// The single accepted document MIME type
    #[serde(default = "default_document_mime")]
    pub document_mime: String,
}

fn default_max_image() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_max_document() -> u64 {
    20 * 1024 * 1024 // 20 MiB
}

fn default_document_mime() -> String {
    "application/pdf".to_string()
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image(),
            max_document_bytes: default_max_document(),
            document_mime: default_document_mime(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(NoduError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(NoduError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("NODU_SERVER_URL") {
            self.server.base_url = url;
        }

        if let Ok(timeout) = std::env::var("NODU_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid NODU_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(cookie) = std::env::var("NODU_SESSION_COOKIE") {
            self.server.session_cookie = Some(cookie);
        }

        if let Ok(tutor) = std::env::var("NODU_DEFAULT_TUTOR") {
            self.chat.default_tutor = Some(tutor);
        }

        if let Ok(name) = std::env::var("NODU_USER_NAME") {
            self.chat.user_name = name;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server) = &cli.server {
            tracing::debug!("Server override from CLI: {}", server);
            self.server.base_url = server.clone();
        }
        if let Some(cookie) = &cli.cookie {
            self.server.session_cookie = Some(cookie.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.server.base_url).map_err(|e| {
            NoduError::Config(format!(
                "Invalid server.base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NoduError::Config(format!(
                "server.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.server.timeout_seconds == 0 || self.server.timeout_seconds > 600 {
            return Err(NoduError::Config(
                "server.timeout_seconds must be between 1 and 600".to_string(),
            )
            .into());
        }

        if self.attachments.max_image_bytes == 0 || self.attachments.max_document_bytes == 0 {
            return Err(NoduError::Config(
                "attachment size limits must be greater than 0".to_string(),
            )
            .into());
        }

        if self.attachments.document_mime.starts_with("image/") {
            return Err(NoduError::Config(
                "attachments.document_mime must not be an image type".to_string(),
            )
            .into());
        }

        if let Some(tutor) = &self.chat.default_tutor {
            if crate::tutors::lookup(tutor).is_none() {
                return Err(
                    NoduError::Config(format!("Unknown chat.default_tutor: {}", tutor)).into(),
                );
            }
        }

        Ok(())
    }
}
