//! Quality Monitor and Meta-Moderator configuration from TOML
//! (`[quality]` and `[moderator]` sections)

use conclave_domain::deliberation::config::DEFAULT_INTERVENTION_THRESHOLD;
use conclave_domain::{ModeratorConfig, QualityMonitorConfig, ReasoningSettings};
use serde::{Deserialize, Serialize};

/// Raw `[quality]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQualityConfig {
    pub enabled: bool,
    /// Overrides `[deliberation].model`
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for FileQualityConfig {
    fn default() -> Self {
        let defaults = QualityMonitorConfig::default().settings;
        Self {
            enabled: true,
            model: None,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }
}

impl FileQualityConfig {
    pub fn to_quality_config(&self, default_model: &str) -> QualityMonitorConfig {
        QualityMonitorConfig {
            enabled: self.enabled,
            settings: ReasoningSettings::new(self.model.as_deref().unwrap_or(default_model))
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens),
        }
    }
}

/// Raw `[moderator]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModeratorConfig {
    pub enabled: bool,
    /// Overrides `[deliberation].model`
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Round quality at or above which no guidance is generated
    pub intervention_threshold: f64,
}

impl Default for FileModeratorConfig {
    fn default() -> Self {
        let defaults = ModeratorConfig::default().settings;
        Self {
            enabled: true,
            model: None,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            intervention_threshold: DEFAULT_INTERVENTION_THRESHOLD,
        }
    }
}

impl FileModeratorConfig {
    pub fn to_moderator_config(&self, default_model: &str) -> ModeratorConfig {
        ModeratorConfig {
            enabled: self.enabled,
            settings: ReasoningSettings::new(self.model.as_deref().unwrap_or(default_model))
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens),
            intervention_threshold: self.intervention_threshold,
        }
    }
}
