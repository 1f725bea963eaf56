//! Expert opinions produced during a round

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One expert's contribution to one round.
///
/// Created by the expert, then scored exactly once by the engine via
/// [`ExpertOpinion::with_quality_score`] before it is stored in the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertOpinion {
    pub expert_id: String,
    pub expert_name: String,
    pub opinion: String,
    pub reasoning: String,
    /// Self-reported confidence in 0..=1
    pub confidence: f64,
    /// Assigned by the quality monitor; `None` until scored
    pub quality_score: Option<f64>,
    /// Position of the expert within the panel (0-based)
    pub rank: usize,
    #[serde(default)]
    pub tokens_used: u64,
    pub submitted_at: DateTime<Utc>,
}

impl ExpertOpinion {
    /// Create an unscored opinion. Confidence is clamped into 0..=1.
    pub fn new(
        expert_id: impl Into<String>,
        expert_name: impl Into<String>,
        opinion: impl Into<String>,
        reasoning: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            expert_id: expert_id.into(),
            expert_name: expert_name.into(),
            opinion: opinion.into(),
            reasoning: reasoning.into(),
            confidence: clamp_unit(confidence),
            quality_score: None,
            rank: 0,
            tokens_used: 0,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_tokens_used(mut self, tokens: u64) -> Self {
        self.tokens_used = tokens;
        self
    }

    /// Attach the quality score. Out-of-range values are clamped.
    pub fn with_quality_score(mut self, score: f64) -> Self {
        self.quality_score = Some(clamp_unit(score));
        self
    }

    pub fn is_scored(&self) -> bool {
        self.quality_score.is_some()
    }
}

/// Clamp into 0..=1, mapping NaN to the neutral midpoint.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}
