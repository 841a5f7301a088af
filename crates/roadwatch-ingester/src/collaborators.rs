//! Collaborator seams for the ingestion pipeline.
//!
//! The orchestrator depends on these traits, not on the concrete HTTP
//! clients, so the pipeline can be exercised end-to-end with in-memory
//! fakes. The adapters below map each client's error type onto the
//! ingester's failure taxonomy.

use crate::error::{IngestError, Result};
use async_trait::async_trait;
use chat_client::{ChatClient, ChatError};
use roadwatch_classify::VisionLabel;
use roadwatch_db::Database;
use roadwatch_report::Report;
use roadwatch_storage::PhotoStore;
use std::time::Duration;
use vision_client::VisionClient;

/// Source of inbound image bytes (the chat platform).
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn download_image(&self, message_id: &str) -> Result<Vec<u8>>;
}

/// Write-only archive for raw photo bytes.
#[async_trait]
pub trait PhotoSink: Send + Sync {
    async fn put_photo(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

/// External vision label detection.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<VisionLabel>>;
}

/// Persistence store for finished reports plus central id issuance.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn next_report_seq(&self) -> Result<i64>;
    async fn persist_report(&self, report: &Report) -> Result<()>;
}

/// Outbound confirmation replies to the reporter.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

const MAX_LABELS: u32 = 10;
const MIN_CONFIDENCE: f32 = 75.0;

/// Persistence calls are additionally bounded here so a stalled pool
/// cannot hold a worker beyond the client-level timeouts.
const PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
impl ImageSource for ChatClient {
    async fn download_image(&self, message_id: &str) -> Result<Vec<u8>> {
        ChatClient::download_image(self, message_id)
            .await
            .map_err(|e| match e {
                ChatError::NotFound(id) => IngestError::ContentNotFound(id),
                other => IngestError::Download(other.to_string()),
            })
    }
}

#[async_trait]
impl ReplySender for ChatClient {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<()> {
        ChatClient::send_reply(self, reply_token, text)
            .await
            .map_err(|e| IngestError::Reply(e.to_string()))
    }
}

#[async_trait]
impl PhotoSink for PhotoStore {
    async fn put_photo(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        Ok(PhotoStore::put_photo(self, key, bytes).await?)
    }
}

#[async_trait]
impl LabelDetector for VisionClient {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<VisionLabel>> {
        Ok(VisionClient::detect_labels(self, image, MAX_LABELS, MIN_CONFIDENCE).await?)
    }
}

#[async_trait]
impl ReportSink for Database {
    async fn next_report_seq(&self) -> Result<i64> {
        match tokio::time::timeout(PERSIST_TIMEOUT, Database::next_report_seq(self)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(IngestError::PersistTransient(
                "report sequence issuance timed out".to_string(),
            )),
        }
    }

    async fn persist_report(&self, report: &Report) -> Result<()> {
        match tokio::time::timeout(PERSIST_TIMEOUT, Database::insert_report(self, report)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(IngestError::PersistTransient(
                "report insert timed out".to_string(),
            )),
        }
    }
}
