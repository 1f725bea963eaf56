//! Context handed to every expert at the start of a round

use super::config::DeliberationConfig;
use super::opinion::ExpertOpinion;
use serde::{Deserialize, Serialize};

/// Cumulative context for one round.
///
/// Every expert in the panel receives an identical copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertContext {
    pub topic: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub constraints: Vec<String>,
    pub round_number: u32,
    /// Opinions of the immediately preceding round (`None` in round 1)
    pub previous_opinions: Option<Vec<ExpertOpinion>>,
    /// Moderator guidance (`None` when no intervention was needed)
    pub guidance: Option<String>,
}

impl ExpertContext {
    pub fn for_round(config: &DeliberationConfig, round_number: u32) -> Self {
        Self {
            topic: config.topic.clone(),
            description: config.description.clone(),
            objectives: config.objectives.clone(),
            constraints: config.constraints.clone(),
            round_number,
            previous_opinions: None,
            guidance: None,
        }
    }

    pub fn with_previous_opinions(mut self, opinions: Vec<ExpertOpinion>) -> Self {
        self.previous_opinions = Some(opinions);
        self
    }

    /// Attach guidance; blank guidance is treated as absent.
    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        let guidance = guidance.into();
        self.guidance = if guidance.trim().is_empty() {
            None
        } else {
            Some(guidance)
        };
        self
    }

    pub fn is_first_round(&self) -> bool {
        self.round_number == 1
    }
}
