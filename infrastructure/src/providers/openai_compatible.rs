//! OpenAI-compatible chat completions provider
//!
//! Works with any server exposing `POST /v1/chat/completions` in the OpenAI
//! wire format (OpenAI itself, vLLM, Ollama, LM Studio, llama.cpp server).

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use conclave_application::{ProviderError, ReasoningProvider, ReasoningRequest, ReasoningResponse};
use conclave_domain::TokenUsage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Reasoning provider speaking the OpenAI chat completions protocol
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("conclave/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: chat_endpoint(base_url),
            api_key,
        })
    }

    /// Build from the `[provider]` section, resolving the API key.
    pub fn from_config(config: &FileProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            info!(
                "No API key found in {}; sending unauthenticated requests",
                config.api_key_env
            );
        }
        Self::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `{base_url}/v1/chat/completions`, tolerating a trailing slash or `/v1`.
fn chat_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

fn chat_body(request: &ReasoningRequest) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatRequest {
        model: request.settings.model.as_str(),
        messages,
        temperature: request.settings.temperature,
        max_tokens: request.settings.max_tokens,
    }
}

fn parse_chat_response(body: &str) -> Result<ReasoningResponse, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Malformed JSON: {}", e)))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse("No message content in response".into()))?;

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(ReasoningResponse::new(text, usage))
}

fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiCompatibleProvider {
    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ProviderError> {
        debug!(
            "POST {} (model: {}, prompt: {} bytes)",
            self.endpoint,
            request.settings.model,
            request.prompt.len()
        );

        let mut builder = self.client.post(&self.endpoint).json(&chat_body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_chat_response(&body)
    }
}
