//! Consensus scoring and the final verdict
//!
//! The deterministic parts of consensus handling live here so that the
//! provider-backed moderator and the no-op moderator agree on them:
//!
//! | Rule | Function |
//! |------|----------|
//! | Fallback consensus score | [`mean_confidence`] |
//! | Dissent detection | [`select_dissenters`] |
//! | Empty-history verdict | [`FinalConsensus::degenerate`] |
//! | Verdict without a moderator | [`fallback_recommendation`] |

use super::opinion::{ExpertOpinion, clamp_unit};
use super::quality::mean;
use super::round::{RoundHistory, RoundResult};
use serde::{Deserialize, Serialize};

/// Experts at or above this confidence are never recorded as dissenting
pub const DISSENT_CONFIDENCE_CEILING: f64 = 0.5;
/// Upper bound on recorded dissenting opinions
pub const MAX_DISSENTERS: usize = 2;
/// Reason attached to every dissenting opinion
pub const DISSENT_REASON: &str = "low confidence in the emerging consensus";
/// Score used when a consensus figure cannot be recovered from provider output
pub const FALLBACK_CONSENSUS_SCORE: f64 = 0.5;
/// Summary used when the provider's summary cannot be recovered
pub const PLACEHOLDER_SUMMARY: &str = "Consensus summary unavailable.";

/// A round's consensus score plus a short rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusAssessment {
    /// Agreement in 0..=1
    pub score: f64,
    pub summary: String,
}

impl ConsensusAssessment {
    /// Create an assessment; the score is clamped into 0..=1.
    pub fn new(score: f64, summary: impl Into<String>) -> Self {
        Self {
            score: clamp_unit(score),
            summary: summary.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_CONSENSUS_SCORE, PLACEHOLDER_SUMMARY)
    }
}

/// A low-confidence position recorded alongside the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissentingOpinion {
    pub expert_id: String,
    pub expert_name: String,
    pub reason: String,
    pub alternative_position: String,
}

/// The verdict produced once, at termination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalConsensus {
    pub achieved: bool,
    /// The final round's consensus score
    pub score: f64,
    pub summary: String,
    pub recommendation: String,
    pub dissenting_opinions: Vec<DissentingOpinion>,
    /// Mean self-reported confidence of the final round
    pub confidence: f64,
}

impl FinalConsensus {
    /// Verdict for an empty history: nothing achieved, nothing dissenting.
    pub fn degenerate() -> Self {
        Self {
            achieved: false,
            score: 0.0,
            summary: "No rounds were completed.".to_string(),
            recommendation: fallback_recommendation(false).to_string(),
            dissenting_opinions: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Assemble the verdict from the round history.
    ///
    /// `achieved`, `score`, dissent and confidence are derived from the last
    /// round; `summary` and `recommendation` come from the caller.
    pub fn from_history(
        history: &RoundHistory,
        threshold_ratio: f64,
        summary: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        let Some(last) = history.last() else {
            return Self::degenerate();
        };

        Self {
            achieved: last.consensus_score >= threshold_ratio,
            score: last.consensus_score,
            summary: summary.into(),
            recommendation: recommendation.into(),
            dissenting_opinions: select_dissenters(last),
            confidence: mean_confidence(&last.opinions),
        }
    }
}

/// Mean self-reported confidence; 0 for no opinions.
pub fn mean_confidence(opinions: &[ExpertOpinion]) -> f64 {
    mean(opinions.iter().map(|o| o.confidence))
}

/// Pick at most [`MAX_DISSENTERS`] lowest-confidence experts of the round,
/// keeping only those strictly below [`DISSENT_CONFIDENCE_CEILING`].
pub fn select_dissenters(round: &RoundResult) -> Vec<DissentingOpinion> {
    round
        .opinions_by_confidence()
        .into_iter()
        .take(MAX_DISSENTERS)
        .filter(|o| o.confidence < DISSENT_CONFIDENCE_CEILING)
        .map(|o| DissentingOpinion {
            expert_id: o.expert_id.clone(),
            expert_name: o.expert_name.clone(),
            reason: DISSENT_REASON.to_string(),
            alternative_position: o.opinion.clone(),
        })
        .collect()
}

/// Fixed recommendation used when no moderator synthesises one.
pub fn fallback_recommendation(achieved: bool) -> &'static str {
    if achieved {
        "Consensus reached: proceed with the position the panel converged on."
    } else {
        "Consensus not reached: gather more information or revisit the question before acting."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::quality::QualityMetrics;

    fn opinion(id: &str, confidence: f64) -> ExpertOpinion {
        ExpertOpinion::new(id, id.to_uppercase(), format!("{id} position"), "why", confidence)
    }

    fn round(n: u32, score: f64, confidences: &[(&str, f64)]) -> RoundResult {
        let opinions = confidences.iter().map(|(id, c)| opinion(id, *c)).collect();
        RoundResult::new(n, opinions, score, QualityMetrics::neutral())
    }

    #[test]
    fn test_assessment_clamped() {
        assert_eq!(ConsensusAssessment::new(3.0, "x").score, 1.0);
        assert_eq!(ConsensusAssessment::new(-3.0, "x").score, 0.0);
        assert_eq!(ConsensusAssessment::fallback().score, 0.5);
    }

    #[test]
    fn test_mean_confidence() {
        let ops = vec![opinion("a", 0.2), opinion("b", 0.8)];
        assert!((mean_confidence(&ops) - 0.5).abs() < 1e-9);
        assert_eq!(mean_confidence(&[]), 0.0);
    }

    #[test]
    fn test_dissenters_at_most_two_below_ceiling() {
        let r = round(
            1,
            0.6,
            &[("a", 0.1), ("b", 0.3), ("c", 0.2), ("d", 0.9)],
        );
        let dissent = select_dissenters(&r);
        assert_eq!(dissent.len(), 2);
        assert_eq!(dissent[0].expert_id, "a");
        assert_eq!(dissent[1].expert_id, "c");
        assert_eq!(dissent[0].reason, DISSENT_REASON);
        assert_eq!(dissent[0].alternative_position, "a position");
    }

    #[test]
    fn test_dissenters_excludes_confident_experts() {
        let r = round(1, 0.6, &[("a", 0.4), ("b", 0.5), ("c", 0.9)]);
        let dissent = select_dissenters(&r);
        assert_eq!(dissent.len(), 1);
        assert_eq!(dissent[0].expert_id, "a");

        let confident = round(1, 0.6, &[("a", 0.5), ("b", 0.7)]);
        assert!(select_dissenters(&confident).is_empty());
    }

    #[test]
    fn test_degenerate() {
        let fc = FinalConsensus::degenerate();
        assert!(!fc.achieved);
        assert_eq!(fc.score, 0.0);
        assert!(fc.dissenting_opinions.is_empty());
    }

    #[test]
    fn test_from_history_uses_last_round() {
        let mut history = RoundHistory::new();
        history.push(round(1, 0.40, &[("a", 0.3)])).unwrap();
        history.push(round(2, 0.75, &[("a", 0.6), ("b", 0.9)])).unwrap();

        let fc = FinalConsensus::from_history(&history, 0.70, "sum", "rec");
        assert!(fc.achieved);
        assert_eq!(fc.score, 0.75);
        assert!(fc.dissenting_opinions.is_empty());
        assert!((fc.confidence - 0.75).abs() < 1e-9);
        assert_eq!(fc.summary, "sum");
    }

    #[test]
    fn test_from_empty_history_is_degenerate() {
        let fc = FinalConsensus::from_history(&RoundHistory::new(), 0.5, "s", "r");
        assert_eq!(fc, FinalConsensus::degenerate());
    }

    #[test]
    fn test_fallback_recommendation_is_binary() {
        assert_ne!(fallback_recommendation(true), fallback_recommendation(false));
    }
}
