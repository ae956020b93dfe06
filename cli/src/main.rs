//! waitstep CLI - plugin entry point.
//!
//! # Architecture
//!
//! The binary is the host-facing side of the plugin. It owns process concerns
//! (arguments, logging, signals, stdout) and hands each invocation a fresh
//! [`StepCtx`] whose cancellation gate the signal listeners feed.
//!
//! ```text
//! main() -> Cli::parse() -> load config -> init_tracing()
//!   schema: StepRegistry::schema() -> stdout
//!   run:    triggers::install() -> input::read_input() -> StepRegistry::run() -> stdout
//!                                                                  |
//!                                                     cancelled -> grace period -> exit
//! ```
//!
//! Stdout carries exactly one JSON document. Logs go to stderr.

mod input;
mod triggers;

use std::io::{Write, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use waitstep_config::WaitstepConfig;
use waitstep_steps::{StepCtx, StepRegistry};
use waitstep_types::OutcomeTag;

#[derive(Parser)]
#[command(name = "waitstep", version)]
#[command(about = "Wait for a duration; SIGTERM, SIGHUP or SIGINT cancels the wait early")]
struct Cli {
    /// Path to config file (default: $WAITSTEP_CONFIG or ~/.waitstep/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the plugin schema document
    Schema,

    /// Run a step and print its output document
    Run {
        /// Step id
        #[arg(short, long, default_value = "wait")]
        step: String,

        /// Input document (JSON, or TOML for *.toml). Reads JSON from stdin when omitted or "-"
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn init_tracing(config_filter: Option<&str>) {
    let mut init_warnings = Vec::new();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config_filter
            .and_then(|directive| match EnvFilter::try_new(directive) {
                Ok(filter) => Some(filter),
                Err(err) => {
                    init_warnings.push(format!(
                        "Ignoring invalid logging.filter {directive:?}: {err}"
                    ));
                    None
                }
            })
            .unwrap_or_else(|| EnvFilter::new("info"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

/// Returns the config and the file it came from, if any.
fn load_config(explicit: Option<&Path>) -> Result<(WaitstepConfig, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = WaitstepConfig::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, Some(path.to_path_buf())))
        }
        None => match WaitstepConfig::load().context("failed to load config")? {
            Some(config) => Ok((config, WaitstepConfig::path())),
            None => Ok((WaitstepConfig::default(), None)),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_source) = load_config(cli.config.as_deref())?;
    init_tracing(config.log_filter());
    match &config_source {
        Some(path) => tracing::debug!(path = %path.display(), "Loaded config"),
        None => tracing::debug!("No config file; using defaults"),
    }

    let registry = StepRegistry::with_builtins();

    match cli.command {
        Command::Schema => {
            let schema = serde_json::to_value(registry.schema())?;
            emit(&schema)?;
        }
        Command::Run { step, file } => {
            run(&registry, &config, &step, file).await?;
        }
    }

    Ok(())
}

async fn run(
    registry: &StepRegistry,
    config: &WaitstepConfig,
    step: &str,
    file: Option<PathBuf>,
) -> Result<()> {
    // Resolve the step before touching signals or input.
    registry.lookup(step)?;

    let ctx = StepCtx::default();
    // Listeners go up before input is read: a signal that arrives early
    // pre-arms the gate instead of killing the process.
    let triggers = triggers::install(&config.signals(), ctx.gate.handle())
        .context("failed to install cancellation signal handlers")?;

    let input = input::read_input(file).await?;
    let output = registry.run(step, input, &ctx).await?;
    drop(triggers);

    emit(&serde_json::to_value(&output)?)?;

    if output.output_id == OutcomeTag::Cancelled.as_str() {
        let grace = config.grace_period();
        if !grace.is_zero() {
            tracing::info!(grace_ms = grace.as_millis() as u64, "Cancelled; waiting before exit");
            tokio::time::sleep(grace).await;
        }
    }

    Ok(())
}

fn emit(document: &Value) -> Result<()> {
    let mut out = stdout().lock();
    serde_json::to_writer_pretty(&mut out, document)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
