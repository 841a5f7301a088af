//! Disaster-type classification from vision-service labels.
//!
//! The vision service returns a flat set of weighted labels for an image.
//! Classification walks a fixed priority list of recognized hazard names
//! and returns the first one present in the label set by exact string
//! match. Confidence scores do not influence the decision; if both
//! "Rockfall" and "Mudslide" appear, "Rockfall" wins because it is
//! earlier in the priority list. Presence of people and vehicles is
//! flagged independently.

use serde::{Deserialize, Serialize};

/// A weighted label returned by the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionLabel {
    pub name: String,
    /// Confidence in percent, 0-100.
    pub confidence: f32,
}

/// The fixed set of hazard types Roadwatch recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisasterType {
    RockFall,
    RoadCollapse,
    Landslide,
    Mudslide,
    Unknown,
}

/// Priority-ordered match table: earlier entries win when several hazard
/// labels are present.
pub const DISASTER_PRIORITY: &[(DisasterType, &str)] = &[
    (DisasterType::RockFall, "Rockfall"),
    (DisasterType::RoadCollapse, "Road Collapse"),
    (DisasterType::Landslide, "Landslide"),
    (DisasterType::Mudslide, "Mudslide"),
];

const PERSON_LABEL: &str = "Person";
const VEHICLE_LABEL: &str = "Vehicle";

impl DisasterType {
    /// Stable English identifier, used in persisted reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisasterType::RockFall => "Rockfall",
            DisasterType::RoadCollapse => "Road Collapse",
            DisasterType::Landslide => "Landslide",
            DisasterType::Mudslide => "Mudslide",
            DisasterType::Unknown => "Unknown",
        }
    }

    /// zh-TW display label, used in reporter-facing reply text.
    pub fn label_zh(&self) -> &'static str {
        match self {
            DisasterType::RockFall => "落石",
            DisasterType::RoadCollapse => "道路坍方",
            DisasterType::Landslide => "山崩",
            DisasterType::Mudslide => "土石流",
            DisasterType::Unknown => "不明",
        }
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's verdict for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneAssessment {
    pub disaster: DisasterType,
    pub people_present: bool,
    pub vehicles_present: bool,
}

/// Classify a label set into a hazard type plus presence flags.
pub fn classify(labels: &[VisionLabel]) -> SceneAssessment {
    let disaster = DISASTER_PRIORITY
        .iter()
        .find(|(_, name)| labels.iter().any(|label| label.name == *name))
        .map(|(disaster, _)| *disaster)
        .unwrap_or(DisasterType::Unknown);

    SceneAssessment {
        disaster,
        people_present: labels.iter().any(|label| label.name == PERSON_LABEL),
        vehicles_present: labels.iter().any(|label| label.name == VEHICLE_LABEL),
    }
}
