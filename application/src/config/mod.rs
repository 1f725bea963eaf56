//! Application-level configuration.
//!
//! - [`EngineOptions`] - round loop execution (parallelism, failure policy)

pub mod engine_options;

pub use engine_options::{EngineOptions, FailurePolicy};
