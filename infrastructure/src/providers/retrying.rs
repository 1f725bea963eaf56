//! Retry decorator for reasoning providers
//!
//! Transient failures ([`ProviderError::is_retryable`]) are retried with
//! exponential backoff; everything else surfaces on the first attempt.

use async_trait::async_trait;
use conclave_application::{ProviderError, ReasoningProvider, ReasoningRequest, ReasoningResponse};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Wraps a provider with bounded retries
pub struct RetryingProvider<P> {
    inner: P,
    max_retries: u32,
    initial_backoff: Duration,
    cancellation: Option<CancellationToken>,
}

impl<P: ReasoningProvider> RetryingProvider<P> {
    pub fn new(inner: P, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            initial_backoff,
            cancellation: None,
        }
    }

    /// Stop waiting between attempts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
            .min(MAX_BACKOFF)
    }

    /// Sleep before the next attempt. Returns `false` if cancelled meanwhile.
    async fn wait(&self, delay: Duration) -> bool {
        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => false,
                    _ = tokio::time::sleep(delay) => true,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                true
            }
        }
    }
}

#[async_trait]
impl<P: ReasoningProvider> ReasoningProvider for RetryingProvider<P> {
    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ProviderError> {
        let mut retry = 0;
        loop {
            match self.inner.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff_for(retry);
                    warn!(
                        "Provider call failed ({}), retry {}/{} in {:?}",
                        e,
                        retry + 1,
                        self.max_retries,
                        delay
                    );
                    if !self.wait(delay).await {
                        return Err(e);
                    }
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::ReasoningSettings;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        outcomes: Mutex<VecDeque<Result<&'static str, ProviderError>>>,
        calls: AtomicU32,
    }

    impl FlakyProvider {
        fn new(outcomes: Vec<Result<&'static str, ProviderError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ReasoningProvider for FlakyProvider {
        async fn generate(
            &self,
            _request: &ReasoningRequest,
        ) -> Result<ReasoningResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok("done"))
                .map(ReasoningResponse::text)
        }
    }

    fn request() -> ReasoningRequest {
        ReasoningRequest::new(ReasoningSettings::default(), "sys", "prompt")
    }

    fn http(status: u16) -> ProviderError {
        ProviderError::Http {
            status,
            body: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let provider = RetryingProvider::new(
            FlakyProvider::new(vec![Err(ProviderError::Timeout), Err(http(503)), Ok("third")]),
            3,
            Duration::from_millis(100),
        );

        let response = provider.generate(&request()).await.unwrap();
        assert_eq!(response.text, "third");
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let provider = RetryingProvider::new(
            FlakyProvider::new(vec![Err(http(429)), Err(http(429)), Err(http(429))]),
            1,
            Duration::from_millis(100),
        );

        assert_eq!(provider.generate(&request()).await, Err(http(429)));
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_surfaces_immediately() {
        let provider = RetryingProvider::new(
            FlakyProvider::new(vec![Err(http(401))]),
            5,
            Duration::from_millis(100),
        );

        assert_eq!(provider.generate(&request()).await, Err(http(401)));
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_backoff() {
        let token = CancellationToken::new();
        token.cancel();
        let provider = RetryingProvider::new(
            FlakyProvider::new(vec![Err(ProviderError::Timeout)]),
            5,
            Duration::from_secs(10),
        )
        .with_cancellation(token);

        assert_eq!(provider.generate(&request()).await, Err(ProviderError::Timeout));
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let provider = RetryingProvider::new(FlakyProvider::new(vec![]), 10, Duration::from_millis(500));
        assert_eq!(provider.backoff_for(0), Duration::from_millis(500));
        assert_eq!(provider.backoff_for(1), Duration::from_secs(1));
        assert_eq!(provider.backoff_for(3), Duration::from_secs(4));
        assert_eq!(provider.backoff_for(9), MAX_BACKOFF);
    }
}
