//! Quality Monitor port

use super::reasoning::ProviderError;
use async_trait::async_trait;
use conclave_domain::{ExpertOpinion, QualityMetrics};
use thiserror::Error;

/// Errors raised by a quality monitor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QualityError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Other error: {0}")]
    Other(String),
}

/// Scores individual opinions and whole rounds
#[async_trait]
pub trait QualityMonitor: Send + Sync {
    /// Score one opinion in 0..=1
    async fn assess_opinion(&self, opinion: &ExpertOpinion, topic: &str)
    -> Result<f64, QualityError>;

    /// Aggregate metrics for a completed round
    async fn assess_round(
        &self,
        opinions: &[ExpertOpinion],
        topic: &str,
    ) -> Result<QualityMetrics, QualityError>;
}
