//! Core types for the Roadwatch ingester

use serde::{Deserialize, Serialize};

/// Statistics about the ingester's operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngesterStats {
    pub reports: u64,
    pub failures: u64,
    pub ignored_events: u64,
}

/// A recently ingested report for display on the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentReport {
    #[serde(rename = "reportId")]
    pub report_id: String,
    #[serde(rename = "disasterType")]
    pub disaster_type: String,
    pub road: Option<String>,
    pub time: chrono::DateTime<chrono::Utc>,
}

/// Inbound webhook envelope from the chat platform.
///
/// Signature verification happens at the platform edge before the body
/// reaches this service; the handler receives the parsed envelope only.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub message: Option<WebhookMessage>,
    #[serde(rename = "replyToken", default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// One image message ready for the pipeline, extracted from the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvent {
    pub message_id: String,
    pub reply_token: String,
    pub reporter_id: String,
}

impl WebhookEnvelope {
    /// Pull out the processable image events; everything else is ignored.
    pub fn image_events(&self) -> Vec<ImageEvent> {
        self.events
            .iter()
            .filter(|event| event.event_type == "message")
            .filter_map(|event| {
                let message = event.message.as_ref()?;
                if message.message_type != "image" {
                    return None;
                }
                Some(ImageEvent {
                    message_id: message.id.clone(),
                    reply_token: event.reply_token.clone()?,
                    reporter_id: event
                        .source
                        .as_ref()
                        .and_then(|s| s.user_id.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> WebhookEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_image_event_extracted() {
        let env = envelope(
            r#"{"events":[{
                "type":"message",
                "message":{"id":"msg-1","type":"image"},
                "replyToken":"rt-1",
                "source":{"userId":"U1234"}
            }]}"#,
        );
        let events = env.image_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message_id, "msg-1");
        assert_eq!(events[0].reply_token, "rt-1");
        assert_eq!(events[0].reporter_id, "U1234");
    }

    #[test]
    fn test_text_messages_are_ignored() {
        let env = envelope(
            r#"{"events":[{
                "type":"message",
                "message":{"id":"msg-2","type":"text"},
                "replyToken":"rt-2"
            }]}"#,
        );
        assert!(env.image_events().is_empty());
    }

    #[test]
    fn test_non_message_events_are_ignored() {
        let env = envelope(r#"{"events":[{"type":"follow","replyToken":"rt-3"}]}"#);
        assert!(env.image_events().is_empty());
    }

    #[test]
    fn test_image_without_reply_token_is_skipped() {
        let env = envelope(
            r#"{"events":[{
                "type":"message",
                "message":{"id":"msg-4","type":"image"}
            }]}"#,
        );
        assert!(env.image_events().is_empty());
    }

    #[test]
    fn test_missing_user_id_defaults_to_unknown() {
        let env = envelope(
            r#"{"events":[{
                "type":"message",
                "message":{"id":"msg-5","type":"image"},
                "replyToken":"rt-5"
            }]}"#,
        );
        assert_eq!(env.image_events()[0].reporter_id, "unknown");
    }

    #[test]
    fn test_empty_envelope() {
        let env = envelope(r#"{}"#);
        assert!(env.image_events().is_empty());
    }
}
