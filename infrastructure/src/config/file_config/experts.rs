//! Expert panel configuration from TOML (`[[experts]]` array)

use conclave_domain::{ExpertProfile, ReasoningSettings};
use serde::{Deserialize, Serialize};

/// One raw `[[experts]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileExpertConfig {
    pub id: String,
    /// Display name; the id is used when absent
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub perspective: String,
    /// Overrides `[deliberation].model`
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl FileExpertConfig {
    /// Convert to a domain profile, filling gaps from `default_model`.
    pub fn to_profile(&self, default_model: &str) -> ExpertProfile {
        let defaults = ReasoningSettings::default();
        let settings = ReasoningSettings::new(self.model.as_deref().unwrap_or(default_model))
            .with_temperature(self.temperature.unwrap_or(defaults.temperature))
            .with_max_tokens(self.max_tokens.unwrap_or(defaults.max_tokens));

        ExpertProfile::new(
            &self.id,
            self.name.as_deref().unwrap_or(&self.id),
            &self.perspective,
        )
        .with_settings(settings)
    }
}
