//! Deliberation domain
//!
//! A panel of independent experts deliberates over a topic in rounds until
//! their consensus score crosses a threshold or the round budget runs out.
//!
//! ```text
//! DeliberationConfig ──▶ ExpertContext (per round)
//!                              │
//!                              ▼
//!                      ExpertOpinion × panel ──▶ QualityMetrics
//!                              │                      │
//!                              ▼                      ▼
//!                      ConsensusAssessment ──▶ RoundResult ──▶ RoundHistory
//!                                                                  │
//!                                                                  ▼
//!                                       FinalConsensus ──▶ DeliberationResult
//! ```
//!
//! Everything here is pure data and arithmetic. Orchestration lives in the
//! application layer.

pub mod config;
pub mod consensus;
pub mod context;
pub mod event;
pub mod opinion;
pub mod parsing;
pub mod progress;
pub mod quality;
pub mod result;
pub mod round;

pub use config::{
    DeliberationConfig, ExpertProfile, ModeratorConfig, QualityMonitorConfig, ReasoningSettings,
};
pub use consensus::{
    ConsensusAssessment, DissentingOpinion, FinalConsensus, fallback_recommendation,
    mean_confidence, select_dissenters,
};
pub use context::ExpertContext;
pub use event::{DeliberationEvent, EventKind};
pub use opinion::ExpertOpinion;
pub use progress::{DeliberationProgress, DeliberationStatus};
pub use quality::QualityMetrics;
pub use result::{DeliberationMetadata, DeliberationResult, TokenUsage};
pub use round::{RoundHistory, RoundResult};
