//! HTTP client for the external label-detection (vision) service.
//!
//! The service accepts a base64-encoded image and returns weighted labels
//! describing what it depicts. Roadwatch feeds those labels to the
//! disaster classifier.

mod client;
mod error;
mod types;

pub use client::VisionClient;
pub use error::{Result, VisionError};
pub use types::{DetectLabelsRequest, DetectLabelsResponse, LabelDto};
