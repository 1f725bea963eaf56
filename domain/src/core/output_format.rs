//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished deliberation is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every round followed by the verdict
    Full,
    /// Only the final consensus (default)
    #[default]
    Verdict,
    /// The whole result as JSON
    Json,
}
