//! Configuration for the Roadwatch ingester
//!
//! All configuration is read once in `main` into an explicit struct and
//! passed down; no module-level singletons.

use crate::error::{IngestError, Result};
use roadwatch_secrets::BotSecrets;
use std::env;
use std::path::PathBuf;

/// Where collaborator credentials come from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Fetch a named bundle from the secrets service.
    Service { base_url: String, secret_name: String },
    /// Credentials supplied directly in the environment (local runs).
    Direct(BotSecrets),
}

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub road_marker_csv: PathBuf,
    pub vision_url: String,
    pub credentials: CredentialSource,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database_url = database_url_from_env()?;

        let road_marker_csv = env::var("ROAD_MARKER_CSV")
            .map(PathBuf::from)
            .map_err(|_| {
                IngestError::Config("ROAD_MARKER_CSV environment variable is required".to_string())
            })?;

        let vision_url = env::var("VISION_URL").map_err(|_| {
            IngestError::Config("VISION_URL environment variable is required".to_string())
        })?;

        let credentials = credentials_from_env()?;

        Ok(Self {
            port,
            database_url,
            road_marker_csv,
            vision_url,
            credentials,
        })
    }
}

/// Support both DATABASE_URL and separate DB_* environment variables
/// (for compatibility with Cloud SQL socket connections)
fn database_url_from_env() -> Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env::var("DB_HOST").map_err(|_| {
        IngestError::Config("DATABASE_URL or DB_HOST environment variable is required".to_string())
    })?;
    let name = env::var("DB_NAME").unwrap_or_else(|_| "roadwatch".to_string());
    let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_default();

    if host.starts_with("/cloudsql/") {
        // Unix socket connection for Cloud SQL
        Ok(format!(
            "postgresql://{}:{}@localhost/{}?host={}",
            user, password, name, host
        ))
    } else {
        let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        Ok(format!(
            "postgresql://{}:{}@{}:{}/{}",
            user, password, host, port, name
        ))
    }
}

/// Prefer the secrets service; fall back to direct env credentials.
fn credentials_from_env() -> Result<CredentialSource> {
    if let Ok(base_url) = env::var("SECRETS_URL") {
        let secret_name = env::var("SECRET_NAME").map_err(|_| {
            IngestError::Config("SECRET_NAME is required when SECRETS_URL is set".to_string())
        })?;
        return Ok(CredentialSource::Service {
            base_url,
            secret_name,
        });
    }

    let direct = |key: &str| {
        env::var(key).map_err(|_| {
            IngestError::Config(format!(
                "{} is required when SECRETS_URL is not set",
                key
            ))
        })
    };

    Ok(CredentialSource::Direct(BotSecrets {
        chat_access_token: direct("CHAT_ACCESS_TOKEN")?,
        vision_api_key: direct("VISION_API_KEY")?,
        storage_bucket_url: direct("STORAGE_URL")?,
        storage_api_key: direct("STORAGE_API_KEY")?,
    }))
}
