//! Meta-Moderator implementations
//!
//! [`ProviderMetaModerator`] asks a reasoning provider for guidance, consensus
//! scores, round summaries and the final synthesis. [`NoopMetaModerator`]
//! derives all of them deterministically from the opinions. Both share the
//! domain rules for dissent selection and the degenerate verdict.

use crate::ports::meta_moderator::{MetaModerator, ModeratorError};
use crate::ports::reasoning::{ReasoningProvider, ReasoningRequest};
use async_trait::async_trait;
use conclave_domain::deliberation::parsing::{
    parse_consensus_response, parse_final_synthesis, try_parse_consensus,
};
use conclave_domain::deliberation::{fallback_recommendation, mean_confidence};
use conclave_domain::{
    ConsensusAssessment, ExpertOpinion, FinalConsensus, ModeratorConfig, PromptTemplate,
    ReasoningSettings, RoundHistory, RoundResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Build the Meta-Moderator selected by `config`.
pub fn meta_moderator_for(
    config: &ModeratorConfig,
    provider: Arc<dyn ReasoningProvider>,
) -> Arc<dyn MetaModerator> {
    if config.enabled {
        Arc::new(ProviderMetaModerator::new(
            config.settings.clone(),
            config.intervention_threshold,
            provider,
        ))
    } else {
        Arc::new(NoopMetaModerator)
    }
}

/// Meta-Moderator backed by a reasoning provider
pub struct ProviderMetaModerator {
    settings: ReasoningSettings,
    intervention_threshold: f64,
    provider: Arc<dyn ReasoningProvider>,
}

impl ProviderMetaModerator {
    pub fn new(
        settings: ReasoningSettings,
        intervention_threshold: f64,
        provider: Arc<dyn ReasoningProvider>,
    ) -> Self {
        Self {
            settings,
            intervention_threshold,
            provider,
        }
    }

    async fn ask(&self, prompt: String) -> Result<String, ModeratorError> {
        let request = ReasoningRequest::new(
            self.settings.clone(),
            PromptTemplate::moderator_system(),
            prompt,
        );
        let response = self.provider.generate(&request).await?;
        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl MetaModerator for ProviderMetaModerator {
    async fn generate_guidance(
        &self,
        round_number: u32,
        history: &RoundHistory,
    ) -> Result<String, ModeratorError> {
        let Some(previous) = history.last() else {
            return Ok(String::new());
        };
        if previous.quality.meets(self.intervention_threshold) {
            debug!(
                "Round {} quality {:.2} meets {:.2}, no guidance",
                previous.round_number, previous.quality.overall_quality, self.intervention_threshold
            );
            return Ok(String::new());
        }

        let weak_areas = previous.quality.weak_areas(self.intervention_threshold);
        info!(
            "Intervening before round {} (weak: {})",
            round_number,
            weak_areas.join(", ")
        );
        self.ask(PromptTemplate::guidance(round_number, previous, &weak_areas))
            .await
    }

    async fn calculate_consensus(
        &self,
        opinions: &[ExpertOpinion],
        topic: &str,
    ) -> Result<ConsensusAssessment, ModeratorError> {
        let text = self.ask(PromptTemplate::consensus(opinions, topic)).await?;
        Ok(match try_parse_consensus(&text) {
            Some(assessment) => assessment,
            None => {
                warn!("Unparseable consensus response, falling back");
                debug!("Raw consensus response: {}", text);
                parse_consensus_response(&text)
            }
        })
    }

    async fn summarize_round(
        &self,
        round: &RoundResult,
        _topic: &str,
    ) -> Result<String, ModeratorError> {
        let text = self
            .ask(PromptTemplate::round_summary(
                round.round_number,
                &round.opinions,
                &round.quality,
            ))
            .await?;
        if text.is_empty() {
            warn!("Empty summary for round {}", round.round_number);
            return Ok(describe_round(round));
        }
        Ok(text)
    }

    async fn generate_final_consensus(
        &self,
        history: &RoundHistory,
        topic: &str,
        threshold_ratio: f64,
    ) -> Result<FinalConsensus, ModeratorError> {
        let Some(last) = history.last() else {
            return Ok(FinalConsensus::degenerate());
        };
        let achieved = last.consensus_score >= threshold_ratio;

        let text = self
            .ask(PromptTemplate::final_synthesis(topic, history, achieved))
            .await?;
        let synthesis = parse_final_synthesis(&text);
        let recommendation = synthesis.recommendation.unwrap_or_else(|| {
            warn!("Final synthesis has no recommendation, using fallback");
            fallback_recommendation(achieved).to_string()
        });

        Ok(FinalConsensus::from_history(
            history,
            threshold_ratio,
            synthesis.summary,
            recommendation,
        ))
    }
}

/// Meta-Moderator used when moderation is disabled
///
/// Consensus is the mean self-reported confidence and the recommendation is
/// a fixed message chosen by whether consensus was achieved.
pub struct NoopMetaModerator;

#[async_trait]
impl MetaModerator for NoopMetaModerator {
    async fn generate_guidance(
        &self,
        _round_number: u32,
        _history: &RoundHistory,
    ) -> Result<String, ModeratorError> {
        Ok(String::new())
    }

    async fn calculate_consensus(
        &self,
        opinions: &[ExpertOpinion],
        _topic: &str,
    ) -> Result<ConsensusAssessment, ModeratorError> {
        let score = mean_confidence(opinions);
        Ok(ConsensusAssessment::new(
            score,
            format!(
                "Mean confidence of {} opinions: {:.2}",
                opinions.len(),
                score
            ),
        ))
    }

    async fn summarize_round(
        &self,
        round: &RoundResult,
        _topic: &str,
    ) -> Result<String, ModeratorError> {
        Ok(describe_round(round))
    }

    async fn generate_final_consensus(
        &self,
        history: &RoundHistory,
        _topic: &str,
        threshold_ratio: f64,
    ) -> Result<FinalConsensus, ModeratorError> {
        let Some(last) = history.last() else {
            return Ok(FinalConsensus::degenerate());
        };
        let achieved = last.consensus_score >= threshold_ratio;
        let summary = format!(
            "After {} round(s) the panel's consensus score is {:.2} against a threshold of {:.2}.",
            history.len(),
            last.consensus_score,
            threshold_ratio
        );
        Ok(FinalConsensus::from_history(
            history,
            threshold_ratio,
            summary,
            fallback_recommendation(achieved),
        ))
    }
}

fn describe_round(round: &RoundResult) -> String {
    format!(
        "Round {}: {} opinion(s), consensus {:.2}, quality {:.2}.",
        round.round_number,
        round.opinions.len(),
        round.consensus_score,
        round.quality.overall_quality
    )
}
