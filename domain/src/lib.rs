//! Domain layer for conclave
//!
//! This crate contains the deliberation data model, configuration
//! validation, consensus rules, output parsing and prompt templates.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Expert**: an independent reasoning unit producing one opinion per round
//! - **Round**: opinion generation, quality assessment and consensus scoring
//! - **Consensus score**: agreement in `0..=1`; crossing the configured
//!   threshold ends the deliberation
//! - **Meta-Moderator**: guidance, consensus scoring and final synthesis

pub mod core;
pub mod deliberation;
pub mod prompt;

// Re-export commonly used types
pub use crate::core::{
    error::{ConfigError, HistoryError},
    model::Model,
    output_format::OutputFormat,
};
pub use deliberation::{
    ConsensusAssessment, DeliberationConfig, DeliberationEvent, DeliberationMetadata,
    DeliberationProgress, DeliberationResult, DeliberationStatus, DissentingOpinion, EventKind,
    ExpertContext, ExpertOpinion, ExpertProfile, FinalConsensus, ModeratorConfig,
    QualityMetrics, QualityMonitorConfig, ReasoningSettings, RoundHistory, RoundResult,
    TokenUsage,
};
pub use prompt::PromptTemplate;
