//! Shared utilities for use cases.
//!
//! Cancellation checking and cancellable expert calls used by the
//! deliberation engine.

use crate::ports::expert::{Expert, ExpertError};
use crate::use_cases::run_deliberation::DeliberationError;
use conclave_domain::{ExpertContext, ExpertOpinion};
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(DeliberationError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), DeliberationError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(DeliberationError::Cancelled);
    }
    Ok(())
}

/// Ask one expert for its opinion, racing the call against cancellation.
pub(crate) async fn generate_cancellable(
    expert: &dyn Expert,
    context: &ExpertContext,
    cancellation_token: &Option<CancellationToken>,
) -> Result<ExpertOpinion, DeliberationError> {
    check_cancelled(cancellation_token)?;

    let result: Result<ExpertOpinion, ExpertError> = match cancellation_token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(DeliberationError::Cancelled),
                result = expert.generate_opinion(context) => result,
            }
        }
        None => expert.generate_opinion(context).await,
    };

    result.map_err(|source| DeliberationError::Expert {
        expert_id: expert.id().to_string(),
        source,
    })
}
