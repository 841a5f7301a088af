//! Roadwatch Ingester - webhook-driven disaster-report ingestion pipeline
//!
//! Receives photo messages from the chat platform, classifies the hazard
//! through the vision service, geolocates the photo from EXIF, correlates
//! the position with the road marker table, persists a structured report
//! and replies to the reporter.

mod collaborators;
mod config;
mod error;
mod pipeline;
mod server;
mod types;

use crate::config::{Config, CredentialSource};
use crate::error::{IngestError, Result};
use crate::pipeline::Pipeline;
use crate::server::{start_server, AppState, ServerState};
use chat_client::ChatClient;
use roadwatch_db::Database;
use roadwatch_roadnet::RoadIndex;
use roadwatch_secrets::{BotSecrets, SecretStore};
use roadwatch_storage::PhotoStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};
use vision_client::VisionClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("roadwatch_ingester=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Roadwatch Ingester...");

    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Road markers: {}", config.road_marker_csv.display());

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Load the road marker reference table; shared read-only afterwards
    let road_index = Arc::new(RoadIndex::from_csv_path(&config.road_marker_csv)?);
    if road_index.is_empty() {
        warn!("Road marker table is empty; reports will carry no road context");
    }

    // Resolve collaborator credentials
    let secrets = resolve_credentials(&config.credentials).await?;

    // Build the pipeline with its concrete collaborators
    let chat = Arc::new(ChatClient::new(&secrets.chat_access_token));
    let pipeline = Arc::new(Pipeline {
        images: chat.clone(),
        photos: Arc::new(PhotoStore::new(
            &secrets.storage_bucket_url,
            &secrets.storage_api_key,
        )),
        vision: Arc::new(VisionClient::new(
            &config.vision_url,
            &secrets.vision_api_key,
        )),
        reports: Arc::new(db),
        replies: chat,
        road_index,
    });

    let app = AppState {
        pipeline,
        state: Arc::new(RwLock::new(ServerState::new())),
    };

    start_server(app, config.port).await?;

    Ok(())
}

async fn resolve_credentials(source: &CredentialSource) -> Result<BotSecrets> {
    match source {
        CredentialSource::Direct(secrets) => Ok(secrets.clone()),
        CredentialSource::Service {
            base_url,
            secret_name,
        } => {
            let store = SecretStore::new(base_url);
            store
                .get(secret_name)
                .await
                .map_err(|e| IngestError::Config(e.to_string()))
        }
    }
}
