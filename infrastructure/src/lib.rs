//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: reasoning providers, configuration file
//! loading, the JSONL event log and identifier generation.

pub mod config;
pub mod ids;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, ConfigValidationError, FileConfig, FileExpertConfig,
    FileOutputConfig, FileProviderConfig,
};
pub use ids::UuidIdGenerator;
pub use logging::JsonlEventLogger;
pub use providers::{OpenAiCompatibleProvider, RetryingProvider};
