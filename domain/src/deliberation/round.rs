//! Round results and the append-only round history

use super::opinion::{ExpertOpinion, clamp_unit};
use super::quality::QualityMetrics;
use crate::core::error::HistoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of one completed round. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-indexed round number
    pub round_number: u32,
    /// Opinions in panel order
    pub opinions: Vec<ExpertOpinion>,
    /// Narrative summary of the round
    pub summary: String,
    /// Consensus score in 0..=1
    pub consensus_score: f64,
    pub quality: QualityMetrics,
    /// Moderator's short consensus rationale
    pub moderator_notes: String,
    pub completed_at: DateTime<Utc>,
}

impl RoundResult {
    pub fn new(
        round_number: u32,
        opinions: Vec<ExpertOpinion>,
        consensus_score: f64,
        quality: QualityMetrics,
    ) -> Self {
        Self {
            round_number,
            opinions,
            summary: String::new(),
            consensus_score: clamp_unit(consensus_score),
            quality,
            moderator_notes: String::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_moderator_notes(mut self, notes: impl Into<String>) -> Self {
        self.moderator_notes = notes.into();
        self
    }

    /// Opinions sorted by self-reported confidence, lowest first.
    ///
    /// Ties keep panel order.
    pub fn opinions_by_confidence(&self) -> Vec<&ExpertOpinion> {
        let mut sorted: Vec<_> = self.opinions.iter().collect();
        sorted.sort_by(|a, b| a.confidence.total_cmp(&b.confidence));
        sorted
    }
}

/// Append-only, contiguously numbered sequence of rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundHistory {
    rounds: Vec<RoundResult>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next round.
    ///
    /// The round number must be exactly one past the last stored round.
    pub fn push(&mut self, round: RoundResult) -> Result<(), HistoryError> {
        let expected = self.next_round_number();
        if round.round_number != expected {
            return Err(HistoryError::OutOfOrder {
                expected,
                got: round.round_number,
            });
        }
        self.rounds.push(round);
        Ok(())
    }

    pub fn next_round_number(&self) -> u32 {
        self.rounds.len() as u32 + 1
    }

    pub fn last(&self) -> Option<&RoundResult> {
        self.rounds.last()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundResult> {
        self.rounds.iter()
    }

    pub fn total_opinions(&self) -> usize {
        self.rounds.iter().map(|r| r.opinions.len()).sum()
    }

    pub fn into_rounds(self) -> Vec<RoundResult> {
        self.rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(n: u32, confidences: &[f64]) -> RoundResult {
        let opinions = confidences
            .iter()
            .enumerate()
            .map(|(i, c)| {
                ExpertOpinion::new(format!("e{i}"), format!("E{i}"), "op", "why", *c).with_rank(i)
            })
            .collect();
        RoundResult::new(n, opinions, 0.5, QualityMetrics::neutral())
    }

    #[test]
    fn test_history_contiguous() {
        let mut history = RoundHistory::new();
        assert_eq!(history.next_round_number(), 1);
        history.push(round(1, &[0.5])).unwrap();
        history.push(round(2, &[0.5, 0.6])).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.total_opinions(), 3);
        assert_eq!(history.last().unwrap().round_number, 2);
    }

    #[test]
    fn test_history_rejects_gap_and_repeat() {
        let mut history = RoundHistory::new();
        assert_eq!(
            history.push(round(2, &[])),
            Err(HistoryError::OutOfOrder {
                expected: 1,
                got: 2
            })
        );
        history.push(round(1, &[])).unwrap();
        assert!(history.push(round(1, &[])).is_err());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_consensus_score_clamped() {
        let r = RoundResult::new(1, vec![], 1.4, QualityMetrics::neutral());
        assert_eq!(r.consensus_score, 1.0);
    }

    #[test]
    fn test_opinions_by_confidence_stable() {
        let r = round(1, &[0.6, 0.2, 0.6, 0.1]);
        let ids: Vec<_> = r
            .opinions_by_confidence()
            .iter()
            .map(|o| o.expert_id.as_str())
            .collect();
        assert_eq!(ids, vec!["e3", "e1", "e0", "e2"]);
    }
}
