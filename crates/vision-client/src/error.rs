//! Error types for the vision service client

use std::fmt;

/// Errors from the vision service.
#[derive(Debug)]
pub enum VisionError {
    /// HTTP request failed (transport error or timeout); retryable.
    Http(reqwest::Error),
    /// The service ran out of quota (HTTP 429).
    QuotaExceeded,
    /// The service answered with a non-success status.
    Api(String),
}

impl fmt::Display for VisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Vision HTTP error: {}", e),
            Self::QuotaExceeded => write!(f, "Vision service quota exceeded"),
            Self::Api(msg) => write!(f, "Vision API error: {}", msg),
        }
    }
}

impl std::error::Error for VisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for vision service operations
pub type Result<T> = std::result::Result<T, VisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_display() {
        let err = VisionError::QuotaExceeded;
        assert_eq!(format!("{}", err), "Vision service quota exceeded");
    }

    #[test]
    fn test_api_error_display() {
        let err = VisionError::Api("status 500".to_string());
        assert_eq!(format!("{}", err), "Vision API error: status 500");
    }
}
