//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - identifier of a reasoning model
//! - [`error::ConfigError`] - configuration validation errors
//! - [`output_format::OutputFormat`] - how results are rendered
//! - [`string::truncate`] - UTF-8 safe truncation for prompts and summaries

pub mod error;
pub mod model;
pub mod output_format;
pub mod string;
