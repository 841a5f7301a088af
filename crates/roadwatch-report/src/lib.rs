//! Report assembly: combines extraction, lookup and classification results
//! into the persisted record and the reporter-facing summary text.
//!
//! Report ids are formatted here from a sequence number issued by the
//! persistence layer, so uniqueness and ordering hold across concurrent
//! workers. The same input assembled twice differs only in its id and
//! upload timestamp.

use chrono::{DateTime, Datelike, Utc};
use roadwatch_classify::{DisasterType, SceneAssessment};
use roadwatch_geo::GeoCoordinate;
use serde::{Deserialize, Serialize};

/// The nearest road marker captured by value at assembly time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestRoad {
    pub road_id: String,
    pub mileage_label: String,
    pub distance_meters: f64,
}

/// One persisted disaster observation derived from one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub disaster_type: DisasterType,
    pub coordinates: GeoCoordinate,
    pub nearest_road: Option<NearestRoad>,
    pub people_present: bool,
    pub vehicles_present: bool,
    /// Verbatim EXIF `DateTimeOriginal`, when the photo carried one.
    pub photo_timestamp: Option<String>,
    pub upload_timestamp: DateTime<Utc>,
    pub reporter_id: String,
    pub photo_storage_key: String,
    pub summary_text: String,
}

/// Everything the assembler needs besides the issued sequence number.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub assessment: SceneAssessment,
    pub coordinates: GeoCoordinate,
    pub nearest_road: Option<NearestRoad>,
    pub photo_timestamp: Option<String>,
    pub reporter_id: String,
    pub photo_storage_key: String,
}

/// Fallback road id for reports with no nearest-road context.
const NO_ROAD_ID: &str = "X";

/// Assemble a report from an issued sequence number and the pipeline's
/// collected results. `upload_timestamp` is captured here, at assembly
/// time, and is always present.
pub fn assemble(seq: i64, input: ReportInput) -> Report {
    let upload_timestamp = Utc::now();
    let report_id = format_report_id(
        input
            .nearest_road
            .as_ref()
            .map(|road| road.road_id.as_str()),
        upload_timestamp.year(),
        seq,
    );
    let summary_text = summary_text(&input);

    Report {
        report_id,
        disaster_type: input.assessment.disaster,
        coordinates: input.coordinates,
        nearest_road: input.nearest_road,
        people_present: input.assessment.people_present,
        vehicles_present: input.assessment.vehicles_present,
        photo_timestamp: input.photo_timestamp,
        upload_timestamp,
        reporter_id: input.reporter_id,
        photo_storage_key: input.photo_storage_key,
        summary_text,
    }
}

/// Format a report id such as `R14-2024-000032`.
///
/// The sequence number comes from a central Postgres sequence, so ids are
/// unique and monotonically orderable across workers; road id and year are
/// a human-readable discriminator for downstream sorting.
fn format_report_id(road_id: Option<&str>, year: i32, seq: i64) -> String {
    format!("R{}-{}-{:06}", road_id.unwrap_or(NO_ROAD_ID), year, seq)
}

/// Deterministic reply text for the reporter, in the platform's language.
fn summary_text(input: &ReportInput) -> String {
    let road_line = match &input.nearest_road {
        Some(road) => format!(
            "台{}線 {} (約 {:.0} 公尺)",
            road.road_id, road.mileage_label, road.distance_meters
        ),
        None => "不明".to_string(),
    };
    let photo_time = input.photo_timestamp.as_deref().unwrap_or("不明");
    let presence = match (
        input.assessment.people_present,
        input.assessment.vehicles_present,
    ) {
        (true, true) => "現場有人員及車輛",
        (true, false) => "現場有人員",
        (false, true) => "現場有車輛",
        (false, false) => "現場無人員車輛",
    };

    format!(
        "災害類型：{}\n座標及定位：緯度: {:.6}, 經度: {:.6}\n鄰近道路：{}\n照片時間：{}\n{}",
        input.assessment.disaster.label_zh(),
        input.coordinates.latitude,
        input.coordinates.longitude,
        road_line,
        photo_time,
        presence,
    )
}
