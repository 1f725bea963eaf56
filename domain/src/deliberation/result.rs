//! The terminal artifact of a deliberation

use super::consensus::FinalConsensus;
use super::round::RoundResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token accounting reported by a reasoning provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage::new(
            self.prompt_tokens + rhs.prompt_tokens,
            self.completion_tokens + rhs.completion_tokens,
        )
    }
}

/// Run statistics attached to a [`DeliberationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationMetadata {
    pub total_rounds: u32,
    pub total_opinions: usize,
    pub total_tokens: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl DeliberationMetadata {
    pub fn new(
        total_rounds: u32,
        total_opinions: usize,
        total_tokens: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            total_rounds,
            total_opinions,
            total_tokens,
            started_at,
            completed_at,
            duration_ms,
        }
    }
}

/// Complete, immutable result of a deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationResult {
    pub id: String,
    pub topic: String,
    pub rounds: Vec<RoundResult>,
    pub final_consensus: FinalConsensus,
    pub metadata: DeliberationMetadata,
}

impl DeliberationResult {
    pub fn last_round(&self) -> Option<&RoundResult> {
        self.rounds.last()
    }

    /// Consensus score trajectory, one entry per round.
    pub fn score_trajectory(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.consensus_score).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_usage_total_and_add() {
        let usage = TokenUsage::new(100, 20) + TokenUsage::new(5, 5);
        assert_eq!(usage, TokenUsage::new(105, 25));
        assert_eq!(usage.total(), 130);
    }

    #[test]
    fn test_metadata_duration() {
        let start = Utc::now();
        let end = start + Duration::milliseconds(1500);
        let meta = DeliberationMetadata::new(2, 6, 900, start, end);
        assert_eq!(meta.duration_ms, 1500);
    }

    #[test]
    fn test_metadata_duration_never_negative() {
        let start = Utc::now();
        let meta = DeliberationMetadata::new(1, 1, 0, start, start - Duration::seconds(1));
        assert_eq!(meta.duration_ms, 0);
    }
}
