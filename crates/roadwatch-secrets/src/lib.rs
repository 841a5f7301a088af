//! Secret bundle retrieval with in-memory TTL caching.
//!
//! Credentials for the chat platform, vision service and photo store live
//! in an external secrets service. The bundle is fetched once and cached
//! with a TTL so rotation propagates without a restart but the hot path
//! never waits on the secrets service.

use moka::future::Cache;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CACHE_TTL_SECS: u64 = 300;

/// One deployment's credential bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct BotSecrets {
    pub chat_access_token: String,
    pub vision_api_key: String,
    pub storage_bucket_url: String,
    pub storage_api_key: String,
}

/// Secrets service client with per-name caching.
pub struct SecretStore {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<String, BotSecrets>,
}

impl SecretStore {
    /// Create a store against the secrets service with the default 5 minute TTL.
    pub fn new(base_url: &str) -> Self {
        Self::with_ttl(base_url, Duration::from_secs(CACHE_TTL_SECS))
    }

    /// Create a store with a custom cache TTL.
    pub fn with_ttl(base_url: &str, ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Fetch the named secret bundle, serving from cache when fresh.
    pub async fn get(&self, name: &str) -> Result<BotSecrets, SecretError> {
        if let Some(cached) = self.cache.get(name).await {
            return Ok(cached);
        }

        let url = format!("{}/secrets/{}", self.base_url, name);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SecretError::Api(format!(
                "Secrets service returned status {} for {}",
                response.status(),
                name
            )));
        }

        let secrets: BotSecrets = response.json().await?;
        debug!(name = %name, "Fetched secret bundle");
        self.cache.insert(name.to_string(), secrets.clone()).await;
        Ok(secrets)
    }
}

/// Errors from the secrets service.
#[derive(Debug)]
pub enum SecretError {
    Http(reqwest::Error),
    Api(String),
}

impl std::fmt::Display for SecretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Secrets HTTP error: {}", e),
            Self::Api(msg) => write!(f, "Secrets API error: {}", msg),
        }
    }
}

impl std::error::Error for SecretError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for SecretError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_deserializes() {
        let json = r#"{
            "chat_access_token": "tok",
            "vision_api_key": "vk",
            "storage_bucket_url": "https://storage.example/bucket",
            "storage_api_key": "sk"
        }"#;
        let secrets: BotSecrets = serde_json::from_str(json).unwrap();
        assert_eq!(secrets.chat_access_token, "tok");
        assert_eq!(secrets.storage_bucket_url, "https://storage.example/bucket");
    }

    #[test]
    fn test_api_error_display() {
        let err = SecretError::Api("status 403 for prod".to_string());
        assert_eq!(format!("{}", err), "Secrets API error: status 403 for prod");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        // Port 9 (discard) refuses connections on loopback.
        let store = SecretStore::new("http://127.0.0.1:9");
        let err = store.get("prod").await.unwrap_err();
        assert!(matches!(err, SecretError::Http(_)));
    }
}
