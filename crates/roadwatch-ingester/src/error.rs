//! Error types for the Roadwatch ingester
//!
//! One variant per distinguishable failure class, so an outer layer can
//! decide retry policy per side effect. Extraction and classification
//! failures degrade the report instead of surfacing here; everything that
//! does surface carries a short machine-readable reason used in stats and
//! in the `Failed` terminal state.

use std::fmt;

#[derive(Debug)]
pub enum IngestError {
    /// Photo carried no usable GPS fix; the report cannot be geolocated.
    NoLocation,
    /// The road marker index has no rows.
    EmptyIndex,
    /// Vision service failed and no labels were obtained.
    Classification(String),
    /// Message content could not be downloaded.
    Download(String),
    /// Message content is gone on the platform side.
    ContentNotFound(String),
    /// Raw photo archive write failed.
    Storage(String),
    /// A report with the issued id already exists.
    PersistConflict(String),
    /// Persistence failed for a retryable reason (timeout, 5xx-equivalent).
    PersistTransient(String),
    /// The confirmation reply could not be delivered.
    Reply(String),
    Config(String),
    /// Server socket failure (bind or serve).
    Server(String),
}

impl IngestError {
    /// Short stable reason string for stats and failure reporting.
    pub fn reason(&self) -> &'static str {
        match self {
            IngestError::NoLocation => "no_location",
            IngestError::EmptyIndex => "empty_index",
            IngestError::Classification(_) => "classification",
            IngestError::Download(_) => "download",
            IngestError::ContentNotFound(_) => "content_not_found",
            IngestError::Storage(_) => "storage",
            IngestError::PersistConflict(_) => "persist_conflict",
            IngestError::PersistTransient(_) => "persist_transient",
            IngestError::Reply(_) => "reply",
            IngestError::Config(_) => "config",
            IngestError::Server(_) => "server",
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::NoLocation => write!(f, "Photo carries no usable GPS position"),
            IngestError::EmptyIndex => write!(f, "Road marker index is empty"),
            IngestError::Classification(msg) => write!(f, "Classification failed: {}", msg),
            IngestError::Download(msg) => write!(f, "Image download failed: {}", msg),
            IngestError::ContentNotFound(id) => write!(f, "Message content not found: {}", id),
            IngestError::Storage(msg) => write!(f, "Photo archive failed: {}", msg),
            IngestError::PersistConflict(id) => write!(f, "Duplicate report id: {}", id),
            IngestError::PersistTransient(msg) => write!(f, "Report persistence failed: {}", msg),
            IngestError::Reply(msg) => write!(f, "Reply delivery failed: {}", msg),
            IngestError::Config(msg) => write!(f, "Configuration error: {}", msg),
            IngestError::Server(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<roadwatch_db::DbError> for IngestError {
    fn from(err: roadwatch_db::DbError) -> Self {
        match err {
            roadwatch_db::DbError::Conflict(id) => IngestError::PersistConflict(id),
            roadwatch_db::DbError::Sqlx(e) => IngestError::PersistTransient(e.to_string()),
        }
    }
}

impl From<vision_client::VisionError> for IngestError {
    fn from(err: vision_client::VisionError) -> Self {
        IngestError::Classification(err.to_string())
    }
}

impl From<roadwatch_storage::StorageError> for IngestError {
    fn from(err: roadwatch_storage::StorageError) -> Self {
        IngestError::Storage(err.to_string())
    }
}

impl From<roadwatch_roadnet::RoadIndexError> for IngestError {
    fn from(err: roadwatch_roadnet::RoadIndexError) -> Self {
        match err {
            roadwatch_roadnet::RoadIndexError::EmptyIndex => IngestError::EmptyIndex,
            other => IngestError::Config(other.to_string()),
        }
    }
}

impl From<tracing_subscriber::filter::ParseError> for IngestError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        IngestError::Config(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Server(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
