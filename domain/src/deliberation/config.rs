//! Deliberation configuration (Entity)
//!
//! [`DeliberationConfig`] is created once before a deliberation starts and
//! never mutated afterwards. [`DeliberationConfig::validate`] is the single
//! gate for configuration errors; the engine refuses to run an invalid config.
//!
//! # Example
//!
//! ```
//! use conclave_domain::deliberation::config::{DeliberationConfig, ExpertProfile};
//!
//! let config = DeliberationConfig::new("delib-1", "Adopt a four-day work week?")
//!     .with_max_rounds(3)
//!     .with_consensus_threshold(70.0)
//!     .with_experts(vec![
//!         ExpertProfile::new("economist", "Economist", "labour economics"),
//!         ExpertProfile::new("hr", "HR Lead", "employee wellbeing"),
//!     ]);
//!
//! assert!(config.validate().is_ok());
//! assert!(config.should_stop(1, 0.7));
//! assert!(!config.should_stop(1, 0.69));
//! assert!(config.should_stop(3, 0.1));
//! ```

use crate::core::error::ConfigError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of rounds before the deliberation gives up on consensus
pub const DEFAULT_MAX_ROUNDS: u32 = 3;
/// Default consensus threshold (percent)
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 75.0;
/// Default round quality below which the moderator intervenes
pub const DEFAULT_INTERVENTION_THRESHOLD: f64 = 0.6;

/// Model selection and sampling parameters for one reasoning participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningSettings {
    pub model: Model,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ReasoningSettings {
    fn default() -> Self {
        Self {
            model: Model::default(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl ReasoningSettings {
    pub fn new(model: impl Into<Model>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        if self.model.is_blank() {
            return Err(ConfigError::EmptyModelName(owner.to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature {
                owner: owner.to_string(),
                value: self.temperature,
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ZeroTokenBudget(owner.to_string()));
        }
        Ok(())
    }
}

/// One member of the expert panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertProfile {
    /// Stable identifier, unique within the panel
    pub id: String,
    /// Display name
    pub name: String,
    /// Field of expertise or viewpoint the expert argues from
    pub perspective: String,
    #[serde(default)]
    pub settings: ReasoningSettings,
}

impl ExpertProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        perspective: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            perspective: perspective.into(),
            settings: ReasoningSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ReasoningSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The panel used when no experts are configured.
    pub fn default_panel() -> Vec<ExpertProfile> {
        vec![
            ExpertProfile::new(
                "analyst",
                "Analyst",
                "evidence, data and quantitative trade-offs",
            ),
            ExpertProfile::new(
                "pragmatist",
                "Pragmatist",
                "implementation cost, feasibility and operational risk",
            ),
            ExpertProfile::new(
                "skeptic",
                "Skeptic",
                "failure modes, hidden assumptions and second-order effects",
            ),
        ]
    }
}

/// Quality Monitor sub-configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMonitorConfig {
    pub enabled: bool,
    pub settings: ReasoningSettings,
}

impl Default for QualityMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ReasoningSettings::default()
                .with_temperature(0.0)
                .with_max_tokens(256),
        }
    }
}

impl QualityMonitorConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Meta-Moderator sub-configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratorConfig {
    pub enabled: bool,
    pub settings: ReasoningSettings,
    /// Round quality (0..=1) at or above which no guidance is generated
    pub intervention_threshold: f64,
}

impl Default for ModeratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ReasoningSettings::default()
                .with_temperature(0.2)
                .with_max_tokens(1024),
            intervention_threshold: DEFAULT_INTERVENTION_THRESHOLD,
        }
    }
}

impl ModeratorConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Immutable configuration of a single deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationConfig {
    pub id: String,
    pub topic: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub constraints: Vec<String>,
    pub max_rounds: u32,
    /// Percentage in 0..=100
    pub consensus_threshold: f64,
    pub experts: Vec<ExpertProfile>,
    pub quality: QualityMonitorConfig,
    pub moderator: ModeratorConfig,
}

impl DeliberationConfig {
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            description: String::new(),
            objectives: Vec::new(),
            constraints: Vec::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            experts: ExpertProfile::default_panel(),
            quality: QualityMonitorConfig::default(),
            moderator: ModeratorConfig::default(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_objectives(mut self, objectives: Vec<String>) -> Self {
        self.objectives = objectives;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_experts(mut self, experts: Vec<ExpertProfile>) -> Self {
        self.experts = experts;
        self
    }

    pub fn with_quality(mut self, quality: QualityMonitorConfig) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_moderator(mut self, moderator: ModeratorConfig) -> Self {
        self.moderator = moderator;
        self
    }

    // ==================== Stop Condition ====================

    /// Threshold expressed on the same 0..=1 scale as consensus scores.
    pub fn threshold_ratio(&self) -> f64 {
        self.consensus_threshold / 100.0
    }

    /// Whether a consensus score meets the configured threshold.
    pub fn is_consensus_reached(&self, score: f64) -> bool {
        score >= self.threshold_ratio()
    }

    /// The round loop's stop predicate.
    ///
    /// Stop after `round` when its score meets the threshold or when the
    /// round budget is exhausted.
    pub fn should_stop(&self, round: u32, score: f64) -> bool {
        self.is_consensus_reached(score) || round >= self.max_rounds
    }

    // ==================== Validation ====================

    /// Validate the configuration. Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if !self.consensus_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.consensus_threshold)
        {
            return Err(ConfigError::ThresholdOutOfRange(self.consensus_threshold));
        }
        if self.experts.is_empty() {
            return Err(ConfigError::EmptyPanel);
        }

        let mut seen = HashSet::new();
        for expert in &self.experts {
            if expert.id.trim().is_empty() {
                return Err(ConfigError::EmptyExpertId);
            }
            if !seen.insert(expert.id.as_str()) {
                return Err(ConfigError::DuplicateExpert(expert.id.clone()));
            }
            expert.settings.validate(&format!("expert '{}'", expert.id))?;
        }

        if self.quality.enabled {
            self.quality.settings.validate("quality monitor")?;
        }
        if self.moderator.enabled {
            self.moderator.settings.validate("moderator")?;
        }
        let intervention = self.moderator.intervention_threshold;
        if !intervention.is_finite() || !(0.0..=1.0).contains(&intervention) {
            return Err(ConfigError::InterventionThresholdOutOfRange(intervention));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeliberationConfig {
        DeliberationConfig::new("delib-1", "Should we migrate to Rust?")
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.experts.len(), 3);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let config = config().with_max_rounds(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroRounds));
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(config().with_consensus_threshold(0.0).validate().is_ok());
        assert!(config().with_consensus_threshold(100.0).validate().is_ok());
        assert_eq!(
            config().with_consensus_threshold(100.5).validate(),
            Err(ConfigError::ThresholdOutOfRange(100.5))
        );
        assert!(matches!(
            config().with_consensus_threshold(-1.0).validate(),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            config().with_consensus_threshold(f64::NAN).validate(),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn test_blank_topic_and_id_rejected() {
        assert_eq!(
            DeliberationConfig::new("x", "  ").validate(),
            Err(ConfigError::EmptyTopic)
        );
        assert_eq!(
            DeliberationConfig::new("", "topic").validate(),
            Err(ConfigError::EmptyId)
        );
    }

    #[test]
    fn test_panel_validation() {
        assert_eq!(
            config().with_experts(vec![]).validate(),
            Err(ConfigError::EmptyPanel)
        );

        let dup = vec![
            ExpertProfile::new("a", "A", "x"),
            ExpertProfile::new("a", "A again", "y"),
        ];
        assert_eq!(
            config().with_experts(dup).validate(),
            Err(ConfigError::DuplicateExpert("a".to_string()))
        );

        let blank = vec![ExpertProfile::new(" ", "Nobody", "x")];
        assert_eq!(
            config().with_experts(blank).validate(),
            Err(ConfigError::EmptyExpertId)
        );
    }

    #[test]
    fn test_expert_settings_validated() {
        let expert = ExpertProfile::new("a", "A", "x")
            .with_settings(ReasoningSettings::new("gpt-4o").with_temperature(3.0));
        assert!(matches!(
            config().with_experts(vec![expert]).validate(),
            Err(ConfigError::InvalidTemperature { .. })
        ));

        let expert = ExpertProfile::new("a", "A", "x")
            .with_settings(ReasoningSettings::new("gpt-4o").with_max_tokens(0));
        assert!(matches!(
            config().with_experts(vec![expert]).validate(),
            Err(ConfigError::ZeroTokenBudget(_))
        ));
    }

    #[test]
    fn test_disabled_components_skip_settings_validation() {
        let mut quality = QualityMonitorConfig::disabled();
        quality.settings.model = Model::new("");
        assert!(config().with_quality(quality).validate().is_ok());
    }

    #[test]
    fn test_intervention_threshold_bounds() {
        let mut moderator = ModeratorConfig::default();
        moderator.intervention_threshold = 1.5;
        assert_eq!(
            config().with_moderator(moderator).validate(),
            Err(ConfigError::InterventionThresholdOutOfRange(1.5))
        );
    }

    #[test]
    fn test_should_stop() {
        let config = config()
            .with_max_rounds(3)
            .with_consensus_threshold(70.0);

        assert!(!config.should_stop(1, 0.40));
        assert!(!config.should_stop(2, 0.55));
        assert!(config.should_stop(2, 0.70));
        assert!(config.should_stop(3, 0.10));
    }

    #[test]
    fn test_zero_threshold_stops_immediately() {
        let config = config().with_consensus_threshold(0.0);
        assert!(config.should_stop(1, 0.0));
    }
}
