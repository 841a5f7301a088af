//! Ingestion pipeline: one inbound image event, end to end.
//!
//! Each event walks a strictly sequential state machine:
//! `Received → Downloaded → Stored → Classified → Geolocated → Correlated
//! → Assembled → Persisted → Replied`, failing into a terminal state with
//! a distinguishable reason from any step. Every step's output feeds the
//! next; there is no internal parallelism. Multiple events may run
//! concurrently in independent tasks; the only shared mutable state is
//! the persistence store and its report sequence.

use crate::collaborators::{ImageSource, LabelDetector, PhotoSink, ReplySender, ReportSink};
use crate::error::{IngestError, Result};
use crate::types::ImageEvent;
use roadwatch_classify::classify;
use roadwatch_report::{assemble, NearestRoad, Report, ReportInput};
use roadwatch_roadnet::{RoadIndex, RoadIndexError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply sent when a photo carries no usable GPS position.
const NO_LOCATION_REPLY: &str =
    "無法從照片取得定位資訊，請開啟相機的定位功能後重新拍攝上傳。";

/// Sequential processing states for one image event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Downloaded,
    Stored,
    Classified,
    Geolocated,
    Correlated,
    Assembled,
    Persisted,
    Replied,
}

/// The orchestrator: owns the collaborator seams and the road index.
pub struct Pipeline {
    pub images: Arc<dyn ImageSource>,
    pub photos: Arc<dyn PhotoSink>,
    pub vision: Arc<dyn LabelDetector>,
    pub reports: Arc<dyn ReportSink>,
    pub replies: Arc<dyn ReplySender>,
    pub road_index: Arc<RoadIndex>,
}

impl Pipeline {
    /// Process one inbound image event to the `Replied` terminal state.
    ///
    /// Side effects (photo archive, report insert, reply) are attempted at
    /// most once each; the returned error names which one failed.
    pub async fn process(&self, event: &ImageEvent) -> Result<Report> {
        debug!(message_id = %event.message_id, stage = ?Stage::Received, "Processing image event");

        let image = self.images.download_image(&event.message_id).await?;
        debug!(message_id = %event.message_id, stage = ?Stage::Downloaded, bytes = image.len(), "Image downloaded");

        let storage_key = roadwatch_storage::photo_key(&event.message_id);
        self.photos.put_photo(&storage_key, image.clone()).await?;
        debug!(message_id = %event.message_id, stage = ?Stage::Stored, key = %storage_key, "Raw photo archived");

        // A vision outage degrades the report to Unknown instead of
        // dropping the event.
        let labels = match self.vision.detect_labels(&image).await {
            Ok(labels) => labels,
            Err(e) => {
                warn!(message_id = %event.message_id, error = %e, "Label detection failed; report degrades to Unknown");
                Vec::new()
            }
        };
        let assessment = classify(&labels);
        debug!(message_id = %event.message_id, stage = ?Stage::Classified, disaster = %assessment.disaster, "Scene classified");

        let metadata = roadwatch_exif::extract(&image);
        let coordinates = match metadata.coordinate {
            Some(c) => c,
            None => {
                // Without a position the report is meaningless, but the
                // reporter still gets told why nothing was filed.
                warn!(message_id = %event.message_id, "No GPS fix in photo; rejecting report");
                if let Err(e) = self
                    .replies
                    .send_reply(&event.reply_token, NO_LOCATION_REPLY)
                    .await
                {
                    warn!(message_id = %event.message_id, error = %e, "Failed to deliver no-location reply");
                }
                return Err(IngestError::NoLocation);
            }
        };
        debug!(message_id = %event.message_id, stage = ?Stage::Geolocated, position = %coordinates, "Photo geolocated");

        let nearest_road = match self.road_index.nearest(&coordinates) {
            Ok(nearest) => Some(NearestRoad {
                road_id: nearest.marker.road_id.clone(),
                mileage_label: nearest.marker.mileage_label.clone(),
                distance_meters: nearest.distance_meters,
            }),
            Err(RoadIndexError::EmptyIndex) => {
                // Policy: proceed with an unknown road rather than drop
                // the report; the index being empty is a deployment issue.
                warn!(message_id = %event.message_id, "Road marker index is empty; filing report without road context");
                None
            }
            Err(e) => return Err(e.into()),
        };
        debug!(message_id = %event.message_id, stage = ?Stage::Correlated, road = ?nearest_road.as_ref().map(|r| &r.road_id), "Nearest road resolved");

        let seq = self.reports.next_report_seq().await?;
        let report = assemble(
            seq,
            ReportInput {
                assessment,
                coordinates,
                nearest_road,
                photo_timestamp: metadata.taken_at,
                reporter_id: event.reporter_id.clone(),
                photo_storage_key: storage_key,
            },
        );
        debug!(message_id = %event.message_id, stage = ?Stage::Assembled, report_id = %report.report_id, "Report assembled");

        self.reports.persist_report(&report).await?;
        debug!(message_id = %event.message_id, stage = ?Stage::Persisted, report_id = %report.report_id, "Report persisted");

        self.replies
            .send_reply(&event.reply_token, &report.summary_text)
            .await?;
        info!(
            message_id = %event.message_id,
            stage = ?Stage::Replied,
            report_id = %report.report_id,
            disaster = %report.disaster_type,
            "Report filed and confirmed"
        );

        Ok(report)
    }
}
