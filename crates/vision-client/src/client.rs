//! Vision service HTTP client

use crate::error::{Result, VisionError};
use crate::types::{DetectLabelsRequest, DetectLabelsResponse};
use base64::Engine;
use roadwatch_classify::VisionLabel;
use std::time::Duration;

/// Client for the external label-detection service.
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VisionClient {
    /// Create a new client with default settings (30 second timeout).
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_timeout(base_url, api_key, Duration::from_secs(30))
    }

    /// Create a new client with a custom timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Detect labels in an image.
    ///
    /// # Arguments
    /// * `image` - Raw image bytes
    /// * `max_labels` - Maximum number of labels to return
    /// * `min_confidence` - Minimum confidence in percent (0-100)
    pub async fn detect_labels(
        &self,
        image: &[u8],
        max_labels: u32,
        min_confidence: f32,
    ) -> Result<Vec<VisionLabel>> {
        let body = DetectLabelsRequest {
            image: base64::engine::general_purpose::STANDARD.encode(image),
            max_labels,
            min_confidence,
        };

        let response = self
            .http
            .post(format!("{}/detect-labels", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VisionError::QuotaExceeded);
        }
        if !response.status().is_success() {
            return Err(VisionError::Api(format!(
                "Vision service returned status {}",
                response.status()
            )));
        }

        let data: DetectLabelsResponse = response.json().await?;
        Ok(data.labels.into_iter().map(Into::into).collect())
    }
}
