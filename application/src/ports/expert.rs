//! Expert port
//!
//! An expert turns a round context into one opinion.

use super::reasoning::ProviderError;
use async_trait::async_trait;
use conclave_domain::{ExpertContext, ExpertOpinion};
use thiserror::Error;

/// Errors raised by an expert
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpertError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Other error: {0}")]
    Other(String),
}

/// A member of the deliberation panel
///
/// Implementations must be independent: one expert's output never depends
/// on another expert's output within the same round.
#[async_trait]
pub trait Expert: Send + Sync {
    /// Stable identifier, unique within the panel
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Produce this expert's opinion for the given round context
    async fn generate_opinion(&self, context: &ExpertContext)
    -> Result<ExpertOpinion, ExpertError>;
}
