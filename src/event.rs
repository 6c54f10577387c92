//! Sign events and subtitle entries, the two records that flow between
//! pipeline stages.

use serde::{Deserialize, Serialize};

/// A recognized sign emitted by a detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignEvent {
    /// Monotonically increasing id, unique within a pipeline run.
    pub id: u64,
    /// Canonical sign text.
    pub sign: String,
    /// Confidence in [0,1].
    pub confidence: f32,
    /// Detection timestamp in epoch milliseconds.
    pub timestamp_ms: u64,
    /// Vocabulary category of the sign, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// True when this event was synthesized from several raw signs.
    #[serde(default)]
    pub is_sentence: bool,
    /// The raw signs a synthesized sentence was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_signs: Option<Vec<String>>,
}

impl SignEvent {
    /// Creates a plain (non-sentence) sign event.
    pub fn new(id: u64, sign: impl Into<String>, confidence: f32, timestamp_ms: u64) -> Self {
        Self {
            id,
            sign: sign.into(),
            confidence,
            timestamp_ms,
            category: None,
            is_sentence: false,
            original_signs: None,
        }
    }
}

/// A finalized subtitle line with its display interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Monotonically increasing id, unique within a pipeline run.
    pub id: u64,
    /// Subtitle text.
    pub text: String,
    /// Interval start in epoch milliseconds.
    pub start_ms: u64,
    /// Interval end in epoch milliseconds.
    pub end_ms: u64,
    /// Confidence of the last sign folded into this entry.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_event_defaults() {
        let event = SignEvent::new(1, "Hello", 0.9, 1000);
        assert_eq!(event.sign, "Hello");
        assert!(!event.is_sentence);
        assert!(event.category.is_none());
        assert!(event.original_signs.is_none());
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = SignEvent {
            id: 7,
            sign: "Thank you".to_string(),
            confidence: 0.88,
            timestamp_ms: 1_700_000_000_000,
            category: Some("greetings".to_string()),
            is_sentence: false,
            original_signs: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SignEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_event_json_optional_fields_default() {
        let json = r#"{"id":1,"sign":"Hello","confidence":0.9,"timestamp_ms":0}"#;
        let event: SignEvent = serde_json::from_str(json).unwrap();
        assert!(!event.is_sentence);
        assert!(event.category.is_none());
    }
}
