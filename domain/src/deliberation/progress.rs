//! Read-only progress snapshot

use super::config::DeliberationConfig;
use super::round::RoundHistory;
use serde::{Deserialize, Serialize};

/// Lifecycle of a deliberation engine.
///
/// `NotStarted → Running → Completed`, or `Running → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliberationStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl DeliberationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliberationStatus::Completed | DeliberationStatus::Failed
        )
    }
}

impl std::fmt::Display for DeliberationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliberationStatus::NotStarted => "not started",
            DeliberationStatus::Running => "running",
            DeliberationStatus::Completed => "completed",
            DeliberationStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Snapshot returned by the engine's progress query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliberationProgress {
    pub status: DeliberationStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    /// Last round's consensus score (0 before any round completes)
    pub last_consensus_score: f64,
    /// Whether the round loop's stop condition holds for the history
    pub is_complete: bool,
}

impl DeliberationProgress {
    pub fn snapshot(
        status: DeliberationStatus,
        config: &DeliberationConfig,
        history: &RoundHistory,
    ) -> Self {
        let (current_round, last_consensus_score, is_complete) = match history.last() {
            Some(last) => (
                last.round_number,
                last.consensus_score,
                config.should_stop(last.round_number, last.consensus_score),
            ),
            None => (0, 0.0, false),
        };

        Self {
            status,
            current_round,
            max_rounds: config.max_rounds,
            last_consensus_score,
            is_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::quality::QualityMetrics;
    use crate::deliberation::round::RoundResult;

    #[test]
    fn test_snapshot_before_start() {
        let config = DeliberationConfig::new("d", "t");
        let p = DeliberationProgress::snapshot(
            DeliberationStatus::NotStarted,
            &config,
            &RoundHistory::new(),
        );
        assert_eq!(p.current_round, 0);
        assert_eq!(p.last_consensus_score, 0.0);
        assert!(!p.is_complete);
        assert_eq!(p.max_rounds, 3);
    }

    #[test]
    fn test_snapshot_tracks_stop_condition() {
        let config = DeliberationConfig::new("d", "t")
            .with_max_rounds(3)
            .with_consensus_threshold(70.0);
        let mut history = RoundHistory::new();
        history
            .push(RoundResult::new(1, vec![], 0.4, QualityMetrics::neutral()))
            .unwrap();

        let p = DeliberationProgress::snapshot(DeliberationStatus::Running, &config, &history);
        assert_eq!(p.current_round, 1);
        assert!(!p.is_complete);

        history
            .push(RoundResult::new(2, vec![], 0.72, QualityMetrics::neutral()))
            .unwrap();
        let p = DeliberationProgress::snapshot(DeliberationStatus::Completed, &config, &history);
        assert_eq!(p.last_consensus_score, 0.72);
        assert!(p.is_complete);
    }

    #[test]
    fn test_status_terminal() {
        assert!(DeliberationStatus::Failed.is_terminal());
        assert!(!DeliberationStatus::Running.is_terminal());
        assert_eq!(DeliberationStatus::NotStarted.to_string(), "not started");
    }
}
