//! Chat platform HTTP client

use crate::error::{ChatError, Result};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct ReplyBody<'a> {
    #[serde(rename = "replyToken")]
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

/// Client for the chat platform's bot API.
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    content_url: String,
    access_token: String,
}

impl ChatClient {
    /// Default bot API base URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.line.me";
    /// Default content delivery base URL.
    pub const DEFAULT_CONTENT_URL: &'static str = "https://api-data.line.me";

    /// Create a new client with default endpoints and a 30 second timeout.
    pub fn new(access_token: &str) -> Self {
        Self::with_base_urls(access_token, Self::DEFAULT_API_URL, Self::DEFAULT_CONTENT_URL)
    }

    /// Create a new client against custom endpoints (test servers, proxies).
    pub fn with_base_urls(access_token: &str, api_url: &str, content_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            content_url: content_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Download the binary content of a received message.
    pub async fn download_image(&self, message_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v2/bot/message/{}/content", self.content_url, message_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChatError::NotFound(message_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ChatError::Api(format!(
                "Content download returned status {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Send a single text reply to the reporter. One attempt, no retry;
    /// reply tokens are single-use on the platform side anyway.
    pub async fn send_reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let body = ReplyBody {
            reply_token,
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.api_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Api(format!(
                "Reply returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
