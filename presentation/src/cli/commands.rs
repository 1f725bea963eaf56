//! CLI command definitions

use clap::{Parser, ValueEnum};
use conclave_application::{EngineOptions, FailurePolicy};
use conclave_domain::{
    DeliberationConfig, ExpertProfile, ModeratorConfig, QualityMonitorConfig, ReasoningSettings,
};
use std::path::PathBuf;

/// Output format for deliberation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round, then the verdict
    Full,
    /// Only the final consensus
    Verdict,
    /// JSON output
    Json,
}

impl From<OutputFormat> for conclave_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => conclave_domain::OutputFormat::Full,
            OutputFormat::Verdict => conclave_domain::OutputFormat::Verdict,
            OutputFormat::Json => conclave_domain::OutputFormat::Json,
        }
    }
}

/// An `--expert NAME[:MODEL]` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertArg {
    pub name: String,
    pub model: Option<String>,
}

impl ExpertArg {
    /// Stable id derived from the name: lowercase, runs of other characters become `-`.
    pub fn id(&self) -> String {
        let mut id = String::with_capacity(self.name.len());
        for c in self.name.trim().chars() {
            if c.is_alphanumeric() {
                id.extend(c.to_lowercase());
            } else if !id.ends_with('-') {
                id.push('-');
            }
        }
        id.trim_matches('-').to_string()
    }

    fn to_profile(&self, default_model: &str) -> ExpertProfile {
        let name = self.name.trim();
        ExpertProfile::new(self.id(), name, name).with_settings(ReasoningSettings::new(
            self.model.as_deref().unwrap_or(default_model),
        ))
    }
}

fn parse_expert(value: &str) -> Result<ExpertArg, String> {
    let (name, model) = match value.split_once(':') {
        Some((name, model)) => (name, Some(model.trim())),
        None => (value, None),
    };
    if name.trim().is_empty() {
        return Err("expert name cannot be empty".to_string());
    }
    if model.is_some_and(str::is_empty) {
        return Err(format!("missing model after ':' in '{value}'"));
    }
    Ok(ExpertArg {
        name: name.trim().to_string(),
        model: model.map(str::to_string),
    })
}

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(author, version, about = "Expert panel deliberation - experts debate until they agree")]
#[command(long_about = r#"
Conclave runs a panel of reasoning experts through repeated rounds of
deliberation until their agreement crosses a threshold or the round budget
runs out.

Each round:
1. Every expert states an opinion, seeing the previous round's positions
2. A Quality Monitor scores the opinions and the round
3. A Meta-Moderator measures consensus and steers weak rounds

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./conclave.toml     Project-level config
3. ~/.config/conclave/config.toml   Global config
4. CONCLAVE_<SECTION>__<KEY> environment variables

Example:
  conclave "Should we migrate the billing service to Rust?"
  conclave --expert "Security:gpt-4o" --expert Finance --max-rounds 5 "Adopt passkeys?"
  conclave -o json --events-log run.jsonl "Move to a monorepo?"
"#)]
pub struct Cli {
    /// The topic to deliberate
    #[arg(required_unless_present = "show_config")]
    pub topic: Option<String>,

    /// Background context for the experts
    #[arg(short, long)]
    pub description: Option<String>,

    /// Objective the panel should address (repeatable)
    #[arg(long = "objective", value_name = "TEXT")]
    pub objectives: Vec<String>,

    /// Constraint the recommendation must respect (repeatable)
    #[arg(long = "constraint", value_name = "TEXT")]
    pub constraints: Vec<String>,

    /// Maximum number of rounds
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Consensus threshold in percent (0-100)
    #[arg(long, value_name = "PERCENT")]
    pub threshold: Option<f64>,

    /// Panel member as NAME or NAME:MODEL (repeatable, replaces the configured panel)
    #[arg(short, long = "expert", value_name = "NAME[:MODEL]", value_parser = parse_expert)]
    pub experts: Vec<ExpertArg>,

    /// Default model for every participant without its own
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Disable provider-backed quality scoring
    #[arg(long)]
    pub no_quality: bool,

    /// Disable the provider-backed Meta-Moderator
    #[arg(long)]
    pub no_moderator: bool,

    /// Ask experts one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Drop failing experts from a round instead of aborting
    #[arg(long)]
    pub skip_failing_experts: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Append every deliberation event to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub events_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Layer command-line overrides on top of a configured deliberation.
    ///
    /// `default_model` is used for `--expert NAME` entries without a model.
    pub fn apply_to(&self, mut config: DeliberationConfig, default_model: &str) -> DeliberationConfig {
        if let Some(description) = &self.description {
            config = config.with_description(description.clone());
        }
        if !self.objectives.is_empty() {
            config = config.with_objectives(self.objectives.clone());
        }
        if !self.constraints.is_empty() {
            config = config.with_constraints(self.constraints.clone());
        }
        if let Some(max_rounds) = self.max_rounds {
            config = config.with_max_rounds(max_rounds);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_consensus_threshold(threshold);
        }
        if !self.experts.is_empty() {
            config = config.with_experts(
                self.experts
                    .iter()
                    .map(|e| e.to_profile(default_model))
                    .collect(),
            );
        }
        if self.no_quality {
            let quality = QualityMonitorConfig {
                enabled: false,
                ..config.quality.clone()
            };
            config = config.with_quality(quality);
        }
        if self.no_moderator {
            let moderator = ModeratorConfig {
                enabled: false,
                ..config.moderator.clone()
            };
            config = config.with_moderator(moderator);
        }
        config
    }

    pub fn apply_to_options(&self, mut options: EngineOptions) -> EngineOptions {
        if self.sequential {
            options = options.with_parallel_experts(false);
        }
        if self.skip_failing_experts {
            options = options.with_failure_policy(FailurePolicy::SkipExpert);
        }
        options
    }
}
