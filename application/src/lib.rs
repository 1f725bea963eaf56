//! Application layer for conclave
//!
//! This crate contains the deliberation engine, the expert / quality /
//! moderation components it drives, port definitions and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineOptions, FailurePolicy};
pub use ports::{
    expert::{Expert, ExpertError},
    id_generator::{IdGenerator, SequentialIdGenerator},
    meta_moderator::{MetaModerator, ModeratorError},
    observer::{ChannelObserver, DeliberationObserver, EventDispatcher, FnObserver, ObserverError},
    quality_monitor::{QualityError, QualityMonitor},
    reasoning::{
        MeteredProvider, ProviderError, ReasoningProvider, ReasoningRequest, ReasoningResponse,
        UsageMeter,
    },
};
pub use use_cases::assess_quality::{NoopQualityMonitor, ProviderQualityMonitor, quality_monitor_for};
pub use use_cases::consult_expert::{ExpertPanel, ProviderExpert};
pub use use_cases::moderate::{NoopMetaModerator, ProviderMetaModerator, meta_moderator_for};
pub use use_cases::run_deliberation::{
    DeliberationEngine, DeliberationEngineBuilder, DeliberationError,
};
