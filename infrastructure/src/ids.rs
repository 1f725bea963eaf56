//! Random deliberation identifiers

use conclave_application::IdGenerator;
use uuid::Uuid;

/// Produces `delib-<uuid v4>`
#[derive(Debug, Clone, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        format!("delib-{}", Uuid::new_v4())
    }
}
