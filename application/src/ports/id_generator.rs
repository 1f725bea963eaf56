//! Deliberation identifier port

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of deliberation identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Deterministic `<prefix>-<n>` identifiers, starting at 1
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
