//! Output configuration from TOML (`[output]` section)

use conclave_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format; the CLI default applies when absent
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Append every event to this JSONL file
    pub events_log: Option<PathBuf>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            events_log: None,
        }
    }
}
