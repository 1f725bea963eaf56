//! Logging infrastructure: durable deliberation event logs.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements
//! the [`DeliberationObserver`](conclave_application::DeliberationObserver) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
