//! Slideshow Sequencer (slidewise-sq) - Main entry point
//!
//! Reads a photo catalog, searches for a high-scoring slideshow within the
//! configured time budget and writes it to the output file.
//!
//! **Usage:**
//! ```bash
//! slidewise-sq <input> [--time-limit-seconds N] [--workers N] [--seed N]
//!              [--max-iterations N] [--config <toml>] [--report <json>]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use slidewise_common::config::{ConfigOverrides, ConfigSource, TomlConfig};
use slidewise_common::format::write_solution_file;
use slidewise_common::{Catalog, SlideUniverse};
use slidewise_sq::{CliFormatter, RunReport, SearchParams, Sequencer};
use tracing::{info, warn};

/// Command-line arguments for slidewise-sq
#[derive(Parser, Debug)]
#[command(name = "slidewise-sq")]
#[command(about = "Arrange a photo catalog into a high-interest slideshow")]
#[command(version)]
struct Args {
    /// Photo catalog to sequence
    input: PathBuf,

    /// Wall-clock budget for the search
    #[arg(long, value_name = "SECONDS")]
    time_limit_seconds: Option<u64>,

    /// Parallel search trajectories (default: one per CPU)
    #[arg(long)]
    workers: Option<usize>,

    /// Base random seed; worker i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Perturbation rounds per worker
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Export a JSON run report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            time_limit_seconds: self.time_limit_seconds,
            workers: self.workers,
            seed: self.seed,
            max_iterations: self.max_iterations,
        }
    }
}

/// Parse arguments; usage errors exit with code 1
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // clap's own usage exit code is 2
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();
    let started_at = chrono::Utc::now();

    let (config, source) =
        TomlConfig::load(args.config.as_deref(), &args.overrides()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    info!(
        "Starting slidewise-sq v{} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        ConfigSource::UnreadableDefault { path, reason } => warn!(
            "Ignoring unreadable default config {}: {}; using built-in defaults",
            path.display(),
            reason
        ),
        ConfigSource::BuiltIn => info!("No config file found, using built-in defaults"),
        ConfigSource::CliFlag(path) | ConfigSource::Environment(path) | ConfigSource::DefaultLocation(path) => {
            info!("Configuration loaded from {}", path.display())
        }
    }

    let catalog = Catalog::from_path(&args.input)
        .with_context(|| format!("Failed to read catalog {}", args.input.display()))?;
    let stats = catalog.stats();
    info!("{}", CliFormatter::format_catalog(&stats));

    let universe = Arc::new(SlideUniverse::generate(&catalog));
    let params = SearchParams::from_config(&config.search);
    info!(
        "Searching for up to {}s with {} workers (seed {})",
        params.time_limit.as_secs(),
        params.workers,
        params.seed
    );

    let sequencer = Sequencer::new(Arc::clone(&universe), params.clone());
    let cancel = sequencer.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping search with best sequence so far");
            cancel.cancel();
        }
    });

    let outcome = sequencer.run().await.context("Search failed")?;
    outcome
        .solution
        .validate(&universe)
        .context("Search produced an invalid slideshow")?;

    let groups = outcome.solution.photo_groups(&universe);
    write_solution_file(&config.output.file, &groups)
        .with_context(|| format!("Failed to write {}", config.output.file.display()))?;
    info!(
        "Wrote {} slides (score {}) to {}",
        groups.len(),
        outcome.total_score,
        config.output.file.display()
    );

    let photos_shown = groups.iter().map(Vec::len).sum();
    let report = RunReport::new(
        started_at,
        &args.input,
        stats,
        &params,
        &outcome,
        photos_shown,
        &config.output.file,
    );
    print!("{}", CliFormatter::format_summary(&report));

    if let Some(path) = &args.report {
        report
            .export_json(path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        info!("Report exported to {}", path.display());
    }

    Ok(())
}
