//! Reasoning provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// Default endpoint of the OpenAI-compatible provider
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Raw `[provider]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL without the `/v1/...` suffix
    pub base_url: String,
    /// Environment variable read for the API key
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent one
    pub backoff_ms: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            timeout_seconds: 120,
            max_retries: 2,
            backoff_ms: 500,
        }
    }
}

impl FileProviderConfig {
    /// The inline key, or the value of `api_key_env` if set and non-empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key
            && !key.trim().is_empty()
        {
            return Some(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_key_wins() {
        let config = FileProviderConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: "CONCLAVE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), Some("sk-inline".to_string()));
    }

    #[test]
    fn test_missing_key_is_none() {
        let config = FileProviderConfig {
            api_key_env: "CONCLAVE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }
}
