//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod deliberation;
mod experts;
mod output;
mod participants;
mod provider;

pub use deliberation::FileDeliberationConfig;
pub use experts::FileExpertConfig;
pub use output::FileOutputConfig;
pub use participants::{FileModeratorConfig, FileQualityConfig};
pub use provider::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, FileProviderConfig};

use conclave_application::EngineOptions;
use conclave_domain::{DeliberationConfig, ExpertProfile, ReasoningSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems in the file configuration that the domain does not check
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("deliberation.model cannot be empty")]
    EmptyModelName,

    #[error("experts[{0}].id cannot be empty")]
    EmptyExpertId(usize),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round loop settings
    pub deliberation: FileDeliberationConfig,
    /// Expert panel; the built-in panel is used when empty
    pub experts: Vec<FileExpertConfig>,
    /// Quality Monitor settings
    pub quality: FileQualityConfig,
    /// Meta-Moderator settings
    pub moderator: FileModeratorConfig,
    /// Reasoning provider connection
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Check the fields the domain never sees.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.deliberation.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if let Some(index) = self.experts.iter().position(|e| e.id.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyExpertId(index));
        }
        Ok(())
    }

    /// Expert profiles from `[[experts]]`, or the built-in panel.
    pub fn expert_profiles(&self) -> Vec<ExpertProfile> {
        let default_model = self.deliberation.model.as_str();
        if self.experts.is_empty() {
            return ExpertProfile::default_panel()
                .into_iter()
                .map(|profile| {
                    let settings = ReasoningSettings {
                        model: default_model.into(),
                        ..profile.settings.clone()
                    };
                    profile.with_settings(settings)
                })
                .collect();
        }
        self.experts
            .iter()
            .map(|e| e.to_profile(default_model))
            .collect()
    }

    /// Build the domain configuration for one deliberation.
    ///
    /// The result is not validated; the engine does that when it is built.
    pub fn to_deliberation_config(
        &self,
        id: impl Into<String>,
        topic: impl Into<String>,
    ) -> DeliberationConfig {
        let default_model = self.deliberation.model.as_str();
        DeliberationConfig::new(id, topic)
            .with_max_rounds(self.deliberation.max_rounds)
            .with_consensus_threshold(self.deliberation.consensus_threshold)
            .with_experts(self.expert_profiles())
            .with_quality(self.quality.to_quality_config(default_model))
            .with_moderator(self.moderator.to_moderator_config(default_model))
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::default()
            .with_parallel_experts(self.deliberation.parallel_experts)
            .with_failure_policy(self.deliberation.failure_policy)
    }
}
