//! HTTP client for the chat platform's bot API.
//!
//! Covers the two calls the ingestion pipeline needs: downloading the
//! binary content of a received image message, and sending the single
//! text reply that confirms (or rejects) a report.

mod client;
mod error;

pub use client::ChatClient;
pub use error::{ChatError, Result};
