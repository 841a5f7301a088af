//! Error types for the chat platform client

use std::fmt;

/// Errors from the chat platform API.
#[derive(Debug)]
pub enum ChatError {
    /// Message content no longer available (HTTP 404).
    NotFound(String),
    /// HTTP request failed (transport error or timeout); retryable.
    Http(reqwest::Error),
    /// The platform answered with a non-success status.
    Api(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Message content not found: {}", id),
            Self::Http(e) => write!(f, "Chat HTTP error: {}", e),
            Self::Api(msg) => write!(f, "Chat API error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for chat platform operations
pub type Result<T> = std::result::Result<T, ChatError>;
