//! Use cases
//!
//! Application-level operations that orchestrate domain logic: the
//! deliberation engine and the components it drives.

pub mod assess_quality;
pub mod consult_expert;
pub mod moderate;
pub mod run_deliberation;
pub(crate) mod shared;
