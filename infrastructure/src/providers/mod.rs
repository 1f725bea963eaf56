//! Reasoning provider adapters
//!
//! - [`OpenAiCompatibleProvider`]: HTTP adapter for `/v1/chat/completions`
//! - [`RetryingProvider`]: bounded retry with exponential backoff around any provider

pub mod openai_compatible;
pub mod retrying;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use retrying::RetryingProvider;
