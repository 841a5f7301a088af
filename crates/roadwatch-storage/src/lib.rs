//! Write-only object storage client for raw report photos.
//!
//! Archives the original image bytes under a key derived from the message
//! id before any processing happens, so the raw evidence survives even
//! when later pipeline stages fail. Nothing in Roadwatch reads the photos
//! back; retrieval is an operator concern.

use std::fmt;
use std::time::Duration;

/// Prefix under which report photos are stored.
const PHOTO_PREFIX: &str = "disaster_photos";

/// Build the storage key for a message's photo.
pub fn photo_key(message_id: &str) -> String {
    format!("{}/{}.jpg", PHOTO_PREFIX, message_id)
}

/// Client for the photo object store.
pub struct PhotoStore {
    http: reqwest::Client,
    bucket_url: String,
    api_key: String,
}

impl PhotoStore {
    /// Create a new client with a 30 second timeout.
    pub fn new(bucket_url: &str, api_key: &str) -> Self {
        Self::with_timeout(bucket_url, api_key, Duration::from_secs(30))
    }

    /// Create a new client with a custom timeout.
    pub fn with_timeout(bucket_url: &str, api_key: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            bucket_url: bucket_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Store photo bytes under the given key. At most one attempt.
    pub async fn put_photo(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.bucket_url, key);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "image/jpeg")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Api(format!(
                "Storage returned status {} for {}",
                response.status(),
                key
            )));
        }

        Ok(())
    }
}

/// Errors from the photo store; all are retryable.
#[derive(Debug)]
pub enum StorageError {
    Http(reqwest::Error),
    Api(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Storage HTTP error: {}", e),
            Self::Api(msg) => write!(f, "Storage API error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_key_format() {
        assert_eq!(photo_key("msg-42"), "disaster_photos/msg-42.jpg");
    }

    #[test]
    fn test_api_error_display() {
        let err = StorageError::Api("status 500 for k".to_string());
        assert_eq!(format!("{}", err), "Storage API error: status 500 for k");
    }
}
