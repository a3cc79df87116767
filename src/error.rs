//! Error types for NODU
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for NODU operations
///
/// Covers configuration loading, backend interactions and attachment
/// staging.
#[derive(Error, Debug)]
pub enum NoduError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend errors (unreachable server, bad status, malformed body)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Attachment validation or encoding errors
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reasons a file selection cannot become the pending attachment
///
/// The display strings are shown to the user verbatim.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// Neither an image nor the accepted document type
    #[error("Please select an image or a PDF file (got {mime})")]
    UnsupportedType {
        /// The MIME type that was sniffed
        mime: String,
    },

    /// File exceeds the bound for its media kind
    #[error("The file is too large: {size} bytes, maximum for a {kind} is {limit} bytes")]
    TooLarge {
        /// "image" or "document"
        kind: &'static str,
        /// Actual size in bytes
        size: u64,
        /// Configured bound in bytes
        limit: u64,
    },

    /// Reading the file for transfer encoding failed
    #[error("Error while loading the file: {0}")]
    Encoding(#[source] std::io::Error),
}

/// Result type alias for NODU operations
///
/// Uses `anyhow::Error` so callers get context and easy propagation.
pub type Result<T> = anyhow::Result<T>;
