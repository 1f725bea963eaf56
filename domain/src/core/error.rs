//! Domain error types

use thiserror::Error;

/// Configuration errors detected before a deliberation starts.
///
/// Every variant is fatal: a config that fails validation never reaches
/// the round loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_rounds must be at least 1")]
    ZeroRounds,

    #[error("consensus_threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(f64),

    #[error("intervention_threshold must be within 0..=1, got {0}")]
    InterventionThresholdOutOfRange(f64),

    #[error("topic cannot be empty")]
    EmptyTopic,

    #[error("deliberation id cannot be empty")]
    EmptyId,

    #[error("expert panel is empty")]
    EmptyPanel,

    #[error("expert id cannot be empty")]
    EmptyExpertId,

    #[error("duplicate expert id: {0}")]
    DuplicateExpert(String),

    #[error("model name cannot be empty ({0})")]
    EmptyModelName(String),

    #[error("temperature for {owner} must be within 0..=2, got {value}")]
    InvalidTemperature { owner: String, value: f64 },

    #[error("max_tokens for {0} cannot be 0")]
    ZeroTokenBudget(String),
}

/// Errors raised by domain collections that guard their own invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("round {got} appended out of order (expected round {expected})")]
    OutOfOrder { expected: u32, got: u32 },
}
