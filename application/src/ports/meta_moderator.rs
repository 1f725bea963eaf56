//! Meta-Moderator port

use super::reasoning::ProviderError;
use async_trait::async_trait;
use conclave_domain::{ConsensusAssessment, ExpertOpinion, FinalConsensus, RoundHistory, RoundResult};
use thiserror::Error;

/// Errors raised by a moderator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModeratorError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Other error: {0}")]
    Other(String),
}

/// Supervises the deliberation between rounds
#[async_trait]
pub trait MetaModerator: Send + Sync {
    /// Guidance for the upcoming round.
    ///
    /// Returns an empty string when the previous round needs no correction
    /// or when there is no previous round.
    async fn generate_guidance(
        &self,
        round_number: u32,
        history: &RoundHistory,
    ) -> Result<String, ModeratorError>;

    /// Consensus score and short rationale for a round's opinions
    async fn calculate_consensus(
        &self,
        opinions: &[ExpertOpinion],
        topic: &str,
    ) -> Result<ConsensusAssessment, ModeratorError>;

    /// Narrative summary of a completed round
    async fn summarize_round(&self, round: &RoundResult, topic: &str)
    -> Result<String, ModeratorError>;

    /// The verdict, produced once at termination
    async fn generate_final_consensus(
        &self,
        history: &RoundHistory,
        topic: &str,
        threshold_ratio: f64,
    ) -> Result<FinalConsensus, ModeratorError>;
}
