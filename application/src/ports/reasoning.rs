//! Reasoning provider port
//!
//! Defines the interface for the text-generation service behind experts,
//! the Quality Monitor and the Meta-Moderator.

use async_trait::async_trait;
use conclave_domain::{ReasoningSettings, TokenUsage};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur while calling a reasoning provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::ConnectionError(_) | ProviderError::Timeout => true,
            ProviderError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub settings: ReasoningSettings,
    pub system_prompt: String,
    pub prompt: String,
}

impl ReasoningRequest {
    pub fn new(
        settings: ReasoningSettings,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
        }
    }
}

/// Generated text plus token accounting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReasoningResponse {
    pub text: String,
    pub usage: TokenUsage,
}

impl ReasoningResponse {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }

    /// Response without usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, TokenUsage::default())
    }
}

/// Text generation service
///
/// This port defines how the application layer talks to language models.
/// Adapters live in the infrastructure layer.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Generate a completion for one request
    async fn generate(&self, request: &ReasoningRequest)
    -> Result<ReasoningResponse, ProviderError>;
}

#[async_trait]
impl<P: ReasoningProvider + ?Sized> ReasoningProvider for Arc<P> {
    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ProviderError> {
        (**self).generate(request).await
    }
}

/// Shared token counter
#[derive(Debug, Clone, Default)]
pub struct UsageMeter {
    total: Arc<Mutex<TokenUsage>>,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: TokenUsage) {
        if let Ok(mut total) = self.total.lock() {
            *total = *total + usage;
        }
    }

    pub fn snapshot(&self) -> TokenUsage {
        self.total.lock().map(|t| *t).unwrap_or_default()
    }
}

/// Decorator recording token usage of every successful call
pub struct MeteredProvider<P> {
    inner: P,
    meter: UsageMeter,
}

impl<P: ReasoningProvider> MeteredProvider<P> {
    pub fn new(inner: P, meter: UsageMeter) -> Self {
        Self { inner, meter }
    }

    pub fn meter(&self) -> &UsageMeter {
        &self.meter
    }
}

#[async_trait]
impl<P: ReasoningProvider> ReasoningProvider for MeteredProvider<P> {
    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ProviderError> {
        let response = self.inner.generate(request).await?;
        self.meter.record(response.usage);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider;

    #[async_trait]
    impl ReasoningProvider for FixedProvider {
        async fn generate(
            &self,
            _request: &ReasoningRequest,
        ) -> Result<ReasoningResponse, ProviderError> {
            Ok(ReasoningResponse::new("ok", TokenUsage::new(10, 5)))
        }
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ProviderError::Timeout.is_retryable());
        let rate_limited = ProviderError::Http {
            status: 429,
            body: String::new(),
        };
        assert!(rate_limited.is_retryable());
        let unauthorized = ProviderError::Http {
            status: 401,
            body: String::new(),
        };
        assert!(!unauthorized.is_retryable());
        assert!(!ProviderError::InvalidResponse("x".into()).is_retryable());
        assert!(!ProviderError::ModelNotAvailable("m".into()).is_retryable());
    }

    #[tokio::test]
    async fn test_metered_provider_accumulates() {
        let meter = UsageMeter::new();
        let provider = MeteredProvider::new(FixedProvider, meter.clone());
        let request = ReasoningRequest::new(ReasoningSettings::default(), "sys", "hi");

        provider.generate(&request).await.unwrap();
        provider.generate(&request).await.unwrap();

        assert_eq!(meter.snapshot(), TokenUsage::new(20, 10));
        assert_eq!(provider.meter().snapshot().total(), 30);
    }
}
