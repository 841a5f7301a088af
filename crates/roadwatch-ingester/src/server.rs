//! HTTP server: chat-platform webhook plus health and stats endpoints.

use crate::pipeline::Pipeline;
use crate::types::{IngesterStats, RecentReport, WebhookEnvelope};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Mutable server-wide counters behind the stats endpoint.
#[derive(Debug)]
pub struct ServerState {
    pub started_at: DateTime<Utc>,
    pub stats: IngesterStats,
    pub recent_reports: Vec<RecentReport>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            stats: IngesterStats::default(),
            recent_reports: Vec::new(),
        }
    }

    pub fn add_recent_report(&mut self, report: RecentReport) {
        self.recent_reports.insert(0, report);
        if self.recent_reports.len() > 10 {
            self.recent_reports.pop();
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<RwLock<ServerState>>;

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub state: SharedState,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    markers: usize,
}

#[derive(Serialize)]
struct StatsResponse {
    uptime: i64,
    stats: IngesterStats,
    #[serde(rename = "recentReports")]
    recent_reports: Vec<RecentReport>,
}

/// Create the HTTP router
pub fn create_router(app: AppState) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(app)
}

/// Start the HTTP server
pub async fn start_server(app: AppState, port: u16) -> std::io::Result<()> {
    let router = create_router(app);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Webhook endpoint: runs the pipeline for each image event in the
/// envelope and always acknowledges, so the platform does not re-deliver.
async fn callback(
    State(app): State<AppState>,
    Json(envelope): Json<WebhookEnvelope>,
) -> &'static str {
    let image_events = envelope.image_events();
    let ignored = envelope.events.len() - image_events.len();
    if ignored > 0 {
        app.state.write().await.stats.ignored_events += ignored as u64;
    }

    for event in &image_events {
        match app.pipeline.process(event).await {
            Ok(report) => {
                let mut s = app.state.write().await;
                s.stats.reports += 1;
                s.add_recent_report(RecentReport {
                    report_id: report.report_id.clone(),
                    disaster_type: report.disaster_type.to_string(),
                    road: report.nearest_road.as_ref().map(|r| r.road_id.clone()),
                    time: report.upload_timestamp,
                });
            }
            Err(e) => {
                error!(message_id = %event.message_id, reason = e.reason(), error = %e, "Image event failed");
                app.state.write().await.stats.failures += 1;
            }
        }
    }

    "OK"
}

async fn health(State(app): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        markers: app.pipeline.road_index.len(),
    })
}

async fn stats(State(app): State<AppState>) -> Json<StatsResponse> {
    let state = app.state.read().await;
    let uptime = (Utc::now() - state.started_at).num_seconds();

    Json(StatsResponse {
        uptime,
        stats: state.stats.clone(),
        recent_reports: state.recent_reports.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ImageSource, LabelDetector, PhotoSink, ReplySender, ReportSink};
    use crate::error::{IngestError, Result};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use roadwatch_classify::VisionLabel;
    use roadwatch_report::Report;
    use roadwatch_roadnet::RoadIndex;
    use tower::ServiceExt;

    struct NoImages;

    #[async_trait]
    impl ImageSource for NoImages {
        async fn download_image(&self, message_id: &str) -> Result<Vec<u8>> {
            Err(IngestError::ContentNotFound(message_id.to_string()))
        }
    }

    struct NoopPhotos;

    #[async_trait]
    impl PhotoSink for NoopPhotos {
        async fn put_photo(&self, _key: &str, _bytes: Vec<u8>) -> Result<()> {
            Ok(())
        }
    }

    struct NoopVision;

    #[async_trait]
    impl LabelDetector for NoopVision {
        async fn detect_labels(&self, _image: &[u8]) -> Result<Vec<VisionLabel>> {
            Ok(Vec::new())
        }
    }

    struct NoopReports;

    #[async_trait]
    impl ReportSink for NoopReports {
        async fn next_report_seq(&self) -> Result<i64> {
            Ok(1)
        }

        async fn persist_report(&self, _report: &Report) -> Result<()> {
            Ok(())
        }
    }

    struct NoopReplies;

    #[async_trait]
    impl ReplySender for NoopReplies {
        async fn send_reply(&self, _reply_token: &str, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    fn test_app() -> AppState {
        let road_index = Arc::new(
            RoadIndex::from_csv_reader(
                "road_id,mileage_label,latitude,longitude\n14,45K+200,25.0331,121.5655\n"
                    .as_bytes(),
            )
            .unwrap(),
        );
        AppState {
            pipeline: Arc::new(Pipeline {
                images: Arc::new(NoImages),
                photos: Arc::new(NoopPhotos),
                vision: Arc::new(NoopVision),
                reports: Arc::new(NoopReports),
                replies: Arc::new(NoopReplies),
                road_index,
            }),
            state: Arc::new(RwLock::new(ServerState::new())),
        }
    }

    #[test]
    fn test_add_recent_report_prepends_and_caps_at_10() {
        let mut state = ServerState::new();
        for i in 0..15 {
            state.add_recent_report(RecentReport {
                report_id: format!("R14-2024-{:06}", i),
                disaster_type: "Rockfall".to_string(),
                road: Some("14".to_string()),
                time: Utc::now(),
            });
        }
        assert_eq!(state.recent_reports.len(), 10);
        assert_eq!(state.recent_reports[0].report_id, "R14-2024-000014");
        assert_eq!(state.recent_reports[9].report_id, "R14-2024-000005");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(test_app());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["markers"], 1);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = test_app();
        {
            let mut s = app.state.write().await;
            s.stats.reports = 42;
            s.stats.failures = 3;
        }
        let router = create_router(app);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["stats"]["reports"], 42);
        assert_eq!(json["stats"]["failures"], 3);
        assert!(json["uptime"].as_i64().unwrap() >= 0);
        assert_eq!(json["recentReports"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_callback_acknowledges_and_counts_failure() {
        // The only image event fails at download (NoImages), but the
        // webhook still acknowledges with 200 OK.
        let app = test_app();
        let router = create_router(app.clone());

        let envelope = r#"{"events":[{
            "type":"message",
            "message":{"id":"msg-1","type":"image"},
            "replyToken":"rt-1",
            "source":{"userId":"U1"}
        }]}"#;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/callback")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(envelope))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let state = app.state.read().await;
        assert_eq!(state.stats.failures, 1);
        assert_eq!(state.stats.reports, 0);
    }

    #[tokio::test]
    async fn test_callback_ignores_non_image_events() {
        let app = test_app();
        let router = create_router(app.clone());

        let envelope = r#"{"events":[
            {"type":"message","message":{"id":"msg-2","type":"text"},"replyToken":"rt-2"},
            {"type":"follow"}
        ]}"#;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/callback")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(envelope))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let state = app.state.read().await;
        assert_eq!(state.stats.ignored_events, 2);
        assert_eq!(state.stats.failures, 0);
    }
}
