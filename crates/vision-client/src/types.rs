//! Wire types for the label-detection endpoint

use roadwatch_classify::VisionLabel;
use serde::{Deserialize, Serialize};

/// Request body for `POST /detect-labels`.
#[derive(Debug, Serialize)]
pub struct DetectLabelsRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    #[serde(rename = "maxLabels")]
    pub max_labels: u32,
    #[serde(rename = "minConfidence")]
    pub min_confidence: f32,
}

/// One label as returned on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelDto {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Confidence")]
    pub confidence: f32,
}

/// Response body for `POST /detect-labels`.
#[derive(Debug, Deserialize)]
pub struct DetectLabelsResponse {
    #[serde(rename = "Labels")]
    pub labels: Vec<LabelDto>,
}

impl From<LabelDto> for VisionLabel {
    fn from(dto: LabelDto) -> Self {
        VisionLabel {
            name: dto.name,
            confidence: dto.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes_service_shape() {
        let json = r#"{"Labels":[{"Name":"Landslide","Confidence":90.5}]}"#;
        let response: DetectLabelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.labels.len(), 1);
        assert_eq!(response.labels[0].name, "Landslide");
        assert!((response.labels[0].confidence - 90.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_label_dto_converts_to_vision_label() {
        let dto = LabelDto {
            name: "Person".to_string(),
            confidence: 80.0,
        };
        let label: VisionLabel = dto.into();
        assert_eq!(label.name, "Person");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = DetectLabelsRequest {
            image: "aGVsbG8=".to_string(),
            max_labels: 10,
            min_confidence: 75.0,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"maxLabels\":10"));
        assert!(json.contains("\"minConfidence\":75.0"));
    }
}
