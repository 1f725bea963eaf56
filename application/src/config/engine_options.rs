//! Engine options: how the round loop executes.
//!
//! [`EngineOptions`] groups the parameters that control the execution of
//! [`DeliberationEngine`](crate::use_cases::run_deliberation::DeliberationEngine).
//! They are application-layer concerns, not deliberation policy: none of
//! them changes when a deliberation stops.

use serde::{Deserialize, Serialize};

/// What the engine does when an expert fails.
///
/// Quality Monitor and Meta-Moderator failures are always fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first expert failure
    #[default]
    Abort,
    /// Omit the failing expert from the round and keep going.
    ///
    /// A round in which every expert fails still aborts.
    SkipExpert,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip_expert" | "skip" => Ok(FailurePolicy::SkipExpert),
            other => Err(format!("unknown failure policy: {other}")),
        }
    }
}

/// Round loop execution parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineOptions {
    /// Fan expert calls out concurrently within a round
    pub parallel_experts: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel_experts: true,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EngineOptions {
    // ==================== Builder Methods ====================

    pub fn with_parallel_experts(mut self, parallel: bool) -> Self {
        self.parallel_experts = parallel;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let options = EngineOptions::default();
        assert!(options.parallel_experts);
        assert_eq!(options.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_builder() {
        let options = EngineOptions::default()
            .with_parallel_experts(false)
            .with_failure_policy(FailurePolicy::SkipExpert);
        assert!(!options.parallel_experts);
        assert_eq!(options.failure_policy, FailurePolicy::SkipExpert);
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert_eq!(
            "skip-expert".parse::<FailurePolicy>(),
            Ok(FailurePolicy::SkipExpert)
        );
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
