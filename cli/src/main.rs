//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use conclave_application::{
    DeliberationEngine, ExpertPanel, IdGenerator, MeteredProvider, ReasoningProvider, UsageMeter,
    meta_moderator_for, quality_monitor_for,
};
use conclave_infrastructure::{
    ConfigLoader, JsonlEventLogger, OpenAiCompatibleProvider, RetryingProvider, UuidIdGenerator,
};
use conclave_presentation::{Cli, ConsoleFormatter, OutputConfig};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Directory for rolling log files; unset disables file logging
const LOG_DIR_ENV: &str = "CONCLAVE_LOG_DIR";

fn init_logging(verbose: u8) -> Option<WorkerGuard> {
    // -v flags win; without them RUST_LOG applies, then "warn"
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "conclave.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling deliberation");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose);

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting conclave");

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    if let Some(model) = &cli.model {
        file_config.deliberation.model = model.clone();
    }

    let output = OutputConfig::resolve(
        cli.output,
        file_config.output.format,
        file_config.output.color,
        cli.quiet,
        std::io::stderr().is_terminal(),
    );
    output.apply_color();

    let topic = cli
        .topic
        .clone()
        .context("A topic is required")?;
    let id = UuidIdGenerator.next_id();
    let config = cli.apply_to(
        file_config.to_deliberation_config(id, topic),
        &file_config.deliberation.model,
    );
    let options = cli.apply_to_options(file_config.engine_options());

    // === Dependency Injection ===
    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let provider_config = &file_config.provider;
    let http = OpenAiCompatibleProvider::from_config(provider_config)?;
    info!("Reasoning provider: {}", http.endpoint());
    let retrying = RetryingProvider::new(
        http,
        provider_config.max_retries,
        Duration::from_millis(provider_config.backoff_ms),
    )
    .with_cancellation(cancellation.clone());

    let meter = UsageMeter::new();
    let provider: Arc<dyn ReasoningProvider> =
        Arc::new(MeteredProvider::new(retrying, meter.clone()));

    let panel = ExpertPanel::from_profiles(&config.experts, Arc::clone(&provider));
    let mut builder = DeliberationEngine::builder(config.clone(), panel)
        .quality_monitor(quality_monitor_for(&config.quality, Arc::clone(&provider)))
        .meta_moderator(meta_moderator_for(&config.moderator, Arc::clone(&provider)))
        .options(options)
        .usage_meter(meter)
        .cancellation_token(cancellation);

    if let Some(progress) = output.progress_observer() {
        builder = builder.observer(progress);
    }

    if let Some(path) = cli.events_log.as_ref().or(file_config.output.events_log.as_ref()) {
        match JsonlEventLogger::new(path) {
            Some(logger) => {
                info!("Writing events to {}", logger.path().display());
                builder = builder.observer(Arc::new(logger));
            }
            None => warn!("Event log disabled: cannot open {}", path.display()),
        }
    }

    let engine = builder.build()?;
    let result = engine.run().await?;

    println!("{}", ConsoleFormatter::render(&result, output.format));

    Ok(())
}
