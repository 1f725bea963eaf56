//! Deliberation configuration from TOML (`[deliberation]` section)

use conclave_application::FailurePolicy;
use conclave_domain::Model;
use conclave_domain::deliberation::config::{DEFAULT_CONSENSUS_THRESHOLD, DEFAULT_MAX_ROUNDS};
use serde::{Deserialize, Serialize};

/// Raw deliberation settings from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliberationConfig {
    /// Upper bound on rounds
    pub max_rounds: u32,
    /// Consensus threshold as a percentage (0-100)
    pub consensus_threshold: f64,
    /// Model used by any participant that does not name its own
    pub model: String,
    /// Ask experts concurrently within a round
    pub parallel_experts: bool,
    /// What to do when an expert fails
    pub failure_policy: FailurePolicy,
}

impl Default for FileDeliberationConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            model: Model::DEFAULT.to_string(),
            parallel_experts: true,
            failure_policy: FailurePolicy::Abort,
        }
    }
}
