//! Presentation-level configuration
//!
//! Resolves how results and progress are shown from the command line and
//! the `[output]` section of the configuration file.

use crate::cli::commands;
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use conclave_application::DeliberationObserver;
use conclave_domain::OutputFormat;
use std::sync::Arc;

/// How progress is reported while deliberating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Nothing (`--quiet`)
    Off,
    /// One plain line per milestone, for pipes and log files
    Lines,
    /// Live progress bars on an interactive terminal
    #[default]
    Bars,
}

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    pub progress: ProgressMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            progress: ProgressMode::default(),
        }
    }
}

impl OutputConfig {
    /// Command-line flags win over the file; the file wins over defaults.
    pub fn resolve(
        cli_format: Option<commands::OutputFormat>,
        file_format: Option<OutputFormat>,
        color: bool,
        quiet: bool,
        interactive: bool,
    ) -> Self {
        let progress = match (quiet, interactive) {
            (true, _) => ProgressMode::Off,
            (false, true) => ProgressMode::Bars,
            (false, false) => ProgressMode::Lines,
        };
        Self {
            format: cli_format
                .map(OutputFormat::from)
                .or(file_format)
                .unwrap_or_default(),
            color,
            progress,
        }
    }

    /// Observer reporting progress in the resolved mode, if any.
    pub fn progress_observer(&self) -> Option<Arc<dyn DeliberationObserver>> {
        match self.progress {
            ProgressMode::Off => None,
            ProgressMode::Lines => Some(Arc::new(SimpleProgress)),
            ProgressMode::Bars => Some(Arc::new(ProgressReporter::new())),
        }
    }

    /// Apply the color preference process-wide.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
