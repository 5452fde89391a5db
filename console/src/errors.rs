//! Error types for the dashboard synchronizer

use thiserror::Error;

/// Main error type for the dashboard synchronizer
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Backend unreachable, timed out, or returned an unreadable body
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ConsoleError {
    /// Text shown to the end user in a notification.
    ///
    /// Rejections show the backend's message verbatim; everything else shows
    /// the full error.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
