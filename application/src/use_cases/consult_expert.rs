//! Provider-backed experts
//!
//! Each expert wraps a reasoning provider with its own perspective and
//! settings. The panel is a plain ordered list; order is the collation order
//! of opinions within a round.

use crate::ports::expert::{Expert, ExpertError};
use crate::ports::reasoning::{ReasoningProvider, ReasoningRequest};
use async_trait::async_trait;
use conclave_domain::deliberation::parsing::parse_opinion_response;
use conclave_domain::{ExpertContext, ExpertOpinion, ExpertProfile, PromptTemplate};
use std::sync::Arc;
use tracing::debug;

/// Expert that asks a reasoning provider for its opinion
pub struct ProviderExpert {
    profile: ExpertProfile,
    provider: Arc<dyn ReasoningProvider>,
    system_prompt: String,
}

impl ProviderExpert {
    pub fn new(profile: ExpertProfile, provider: Arc<dyn ReasoningProvider>) -> Self {
        let system_prompt = PromptTemplate::expert_system(&profile);
        Self {
            profile,
            provider,
            system_prompt,
        }
    }

    pub fn profile(&self) -> &ExpertProfile {
        &self.profile
    }
}

#[async_trait]
impl Expert for ProviderExpert {
    fn id(&self) -> &str {
        &self.profile.id
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn generate_opinion(
        &self,
        context: &ExpertContext,
    ) -> Result<ExpertOpinion, ExpertError> {
        let request = ReasoningRequest::new(
            self.profile.settings.clone(),
            self.system_prompt.clone(),
            PromptTemplate::expert_round(context),
        );

        let response = self.provider.generate(&request).await?;
        if response.text.trim().is_empty() {
            return Err(ExpertError::EmptyResponse);
        }

        let parsed = parse_opinion_response(&response.text);
        debug!(
            "Expert {} round {}: confidence {:.2}",
            self.profile.id, context.round_number, parsed.confidence
        );

        Ok(ExpertOpinion::new(
            &self.profile.id,
            &self.profile.name,
            parsed.opinion,
            parsed.reasoning,
            parsed.confidence,
        )
        .with_tokens_used(response.usage.total()))
    }
}

/// Ordered set of experts taking part in a deliberation
#[derive(Clone, Default)]
pub struct ExpertPanel {
    experts: Vec<Arc<dyn Expert>>,
}

impl ExpertPanel {
    pub fn new(experts: Vec<Arc<dyn Expert>>) -> Self {
        Self { experts }
    }

    /// One [`ProviderExpert`] per profile, sharing a provider
    pub fn from_profiles(profiles: &[ExpertProfile], provider: Arc<dyn ReasoningProvider>) -> Self {
        let experts = profiles
            .iter()
            .map(|p| Arc::new(ProviderExpert::new(p.clone(), Arc::clone(&provider))) as Arc<dyn Expert>)
            .collect();
        Self { experts }
    }

    pub fn push(&mut self, expert: Arc<dyn Expert>) {
        self.experts.push(expert);
    }

    pub fn len(&self) -> usize {
        self.experts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Expert>> {
        self.experts.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.experts.iter().map(|e| e.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::reasoning::{ProviderError, ReasoningResponse};
    use conclave_domain::{DeliberationConfig, TokenUsage};
    use std::sync::Mutex;

    struct ScriptedProvider {
        reply: String,
        requests: Mutex<Vec<ReasoningRequest>>,
    }

    impl ScriptedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningProvider for ScriptedProvider {
        async fn generate(
            &self,
            request: &ReasoningRequest,
        ) -> Result<ReasoningResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(ReasoningResponse::new(&self.reply, TokenUsage::new(30, 12)))
        }
    }

    #[tokio::test]
    async fn test_provider_expert_parses_reply() {
        let provider = Arc::new(ScriptedProvider::new(
            "OPINION: Migrate the parser first.\nREASONING: It is isolated.\nCONFIDENCE: 0.8",
        ));
        let profile = ExpertProfile::new("pragmatist", "Pragmatist", "delivery risk");
        let expert = ProviderExpert::new(profile, provider.clone());
        let config = DeliberationConfig::new("d", "Adopt Rust?");

        let opinion = expert
            .generate_opinion(&ExpertContext::for_round(&config, 1))
            .await
            .unwrap();

        assert_eq!(opinion.expert_id, "pragmatist");
        assert_eq!(opinion.opinion, "Migrate the parser first.");
        assert_eq!(opinion.reasoning, "It is isolated.");
        assert_eq!(opinion.confidence, 0.8);
        assert_eq!(opinion.tokens_used, 42);
        assert!(!opinion.is_scored());

        let requests = provider.requests.lock().unwrap();
        assert!(requests[0].system_prompt.contains("delivery risk"));
        assert!(requests[0].prompt.contains("Adopt Rust?"));
    }

    #[tokio::test]
    async fn test_provider_expert_rejects_empty_reply() {
        let provider = Arc::new(ScriptedProvider::new("   "));
        let expert = ProviderExpert::new(ExpertProfile::new("a", "A", "p"), provider);
        let config = DeliberationConfig::new("d", "t");

        let result = expert
            .generate_opinion(&ExpertContext::for_round(&config, 1))
            .await;
        assert_eq!(result, Err(ExpertError::EmptyResponse));
    }

    #[test]
    fn test_panel_from_profiles_keeps_order() {
        let provider: Arc<dyn ReasoningProvider> = Arc::new(ScriptedProvider::new("x"));
        let panel = ExpertPanel::from_profiles(&ExpertProfile::default_panel(), provider);
        assert_eq!(panel.len(), 3);
        assert_eq!(panel.ids(), vec!["analyst", "pragmatist", "skeptic"]);
    }
}
