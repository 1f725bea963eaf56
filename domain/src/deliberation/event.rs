//! Progress events emitted by the deliberation engine
//!
//! Events are transient: the engine never stores or replays them. A
//! consumer that needs durability persists them as they arrive.

use super::quality::QualityMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The nine kinds of progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    DeliberationStarted {
        deliberation_id: String,
        topic: String,
        max_rounds: u32,
        expert_count: usize,
    },
    RoundStarted {
        round: u32,
        has_guidance: bool,
    },
    ExpertThinking {
        round: u32,
        expert_id: String,
        expert_name: String,
    },
    OpinionSubmitted {
        round: u32,
        expert_id: String,
        confidence: f64,
        quality_score: Option<f64>,
    },
    QualityAssessed {
        round: u32,
        metrics: QualityMetrics,
    },
    RoundCompleted {
        round: u32,
        consensus_score: f64,
        summary: String,
    },
    ConsensusCalculated {
        round: u32,
        score: f64,
        threshold: f64,
        reached: bool,
    },
    DeliberationCompleted {
        deliberation_id: String,
        total_rounds: u32,
        achieved: bool,
        score: f64,
    },
    ErrorOccurred {
        round: Option<u32>,
        message: String,
        fatal: bool,
    },
}

impl EventKind {
    /// Stable snake_case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DeliberationStarted { .. } => "deliberation_started",
            EventKind::RoundStarted { .. } => "round_started",
            EventKind::ExpertThinking { .. } => "expert_thinking",
            EventKind::OpinionSubmitted { .. } => "opinion_submitted",
            EventKind::QualityAssessed { .. } => "quality_assessed",
            EventKind::RoundCompleted { .. } => "round_completed",
            EventKind::ConsensusCalculated { .. } => "consensus_calculated",
            EventKind::DeliberationCompleted { .. } => "deliberation_completed",
            EventKind::ErrorOccurred { .. } => "error_occurred",
        }
    }
}

/// A timestamped progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl DeliberationEvent {
    pub fn now(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Free-form JSON view of the event's fields (without `type`).
    pub fn payload(&self) -> Value {
        match serde_json::to_value(&self.kind) {
            Ok(Value::Object(mut map)) => {
                map.remove("type");
                Value::Object(map)
            }
            Ok(other) => other,
            Err(_) => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DeliberationEvent::now(EventKind::RoundStarted {
            round: 2,
            has_guidance: true,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "round_started");
        assert_eq!(json["round"], 2);
        assert_eq!(json["has_guidance"], true);
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_payload_omits_type() {
        let event = DeliberationEvent::now(EventKind::ErrorOccurred {
            round: None,
            message: "boom".to_string(),
            fatal: true,
        });
        let payload = event.payload();
        assert!(payload.get("type").is_none());
        assert_eq!(payload["message"], "boom");
        assert_eq!(event.kind_name(), "error_occurred");
    }

    #[test]
    fn test_event_roundtrip() {
        let event = DeliberationEvent::now(EventKind::ConsensusCalculated {
            round: 1,
            score: 0.8,
            threshold: 0.7,
            reached: true,
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: DeliberationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
