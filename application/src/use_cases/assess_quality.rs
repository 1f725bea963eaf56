//! Quality Monitor implementations
//!
//! | Implementation | Per-opinion score | Round metrics |
//! |----------------|-------------------|---------------|
//! | [`ProviderQualityMonitor`] | provider-scored | confidence, coherence, diversity, relevance |
//! | [`NoopQualityMonitor`] | neutral 0.5 | neutral, mean confidence still computed |
//!
//! [`quality_monitor_for`] picks one from configuration.

use crate::ports::quality_monitor::{QualityError, QualityMonitor};
use crate::ports::reasoning::{ReasoningProvider, ReasoningRequest};
use async_trait::async_trait;
use conclave_domain::deliberation::consensus::mean_confidence;
use conclave_domain::deliberation::parsing::try_parse_quality_score;
use conclave_domain::deliberation::quality::{NEUTRAL_QUALITY, lexical_diversity, mean};
use conclave_domain::{
    ExpertOpinion, PromptTemplate, QualityMetrics, QualityMonitorConfig, ReasoningSettings,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Build the Quality Monitor selected by `config`.
pub fn quality_monitor_for(
    config: &QualityMonitorConfig,
    provider: Arc<dyn ReasoningProvider>,
) -> Arc<dyn QualityMonitor> {
    if config.enabled {
        Arc::new(ProviderQualityMonitor::new(config.settings.clone(), provider))
    } else {
        Arc::new(NoopQualityMonitor)
    }
}

/// Quality Monitor backed by a reasoning provider
pub struct ProviderQualityMonitor {
    settings: ReasoningSettings,
    provider: Arc<dyn ReasoningProvider>,
}

impl ProviderQualityMonitor {
    pub fn new(settings: ReasoningSettings, provider: Arc<dyn ReasoningProvider>) -> Self {
        Self { settings, provider }
    }

    async fn score(&self, prompt: String, what: &str) -> Result<f64, QualityError> {
        let request = ReasoningRequest::new(
            self.settings.clone(),
            PromptTemplate::quality_system(),
            prompt,
        );
        let response = self.provider.generate(&request).await?;

        Ok(match try_parse_quality_score(&response.text) {
            Some(score) => score,
            None => {
                warn!("Unparseable {} score, using {}", what, NEUTRAL_QUALITY);
                debug!("Raw {} response: {}", what, response.text);
                NEUTRAL_QUALITY
            }
        })
    }
}

#[async_trait]
impl QualityMonitor for ProviderQualityMonitor {
    async fn assess_opinion(
        &self,
        opinion: &ExpertOpinion,
        topic: &str,
    ) -> Result<f64, QualityError> {
        self.score(PromptTemplate::opinion_quality(opinion, topic), "opinion quality")
            .await
    }

    async fn assess_round(
        &self,
        opinions: &[ExpertOpinion],
        topic: &str,
    ) -> Result<QualityMetrics, QualityError> {
        if opinions.is_empty() {
            return Ok(QualityMetrics::from_components(0.0, 0.0, 0.0, 0.0));
        }

        let coherence = mean(
            opinions
                .iter()
                .map(|o| o.quality_score.unwrap_or(NEUTRAL_QUALITY)),
        );
        let texts: Vec<&str> = opinions.iter().map(|o| o.opinion.as_str()).collect();
        let diversity = lexical_diversity(&texts[..]);
        let relevance = self
            .score(PromptTemplate::round_relevance(opinions, topic), "relevance")
            .await?;

        let metrics = QualityMetrics::from_components(
            mean_confidence(opinions),
            coherence,
            diversity,
            relevance,
        );
        debug!("Round quality: {:?}", metrics);
        Ok(metrics)
    }
}

/// Quality Monitor used when assessment is disabled
pub struct NoopQualityMonitor;

#[async_trait]
impl QualityMonitor for NoopQualityMonitor {
    async fn assess_opinion(
        &self,
        _opinion: &ExpertOpinion,
        _topic: &str,
    ) -> Result<f64, QualityError> {
        Ok(NEUTRAL_QUALITY)
    }

    async fn assess_round(
        &self,
        opinions: &[ExpertOpinion],
        _topic: &str,
    ) -> Result<QualityMetrics, QualityError> {
        Ok(QualityMetrics::from_components(
            mean_confidence(opinions),
            NEUTRAL_QUALITY,
            NEUTRAL_QUALITY,
            NEUTRAL_QUALITY,
        ))
    }
}
