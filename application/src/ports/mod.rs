//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters and the
//! deliberation components must implement.

pub mod expert;
pub mod id_generator;
pub mod meta_moderator;
pub mod observer;
pub mod quality_monitor;
pub mod reasoning;
