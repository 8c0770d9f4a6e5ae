//! Slideshow Scoring Utility
//!
//! Validates an existing solution file against its catalog and prints the
//! total interest score.
//!
//! **Usage:**
//! ```bash
//! score-solution <catalog> <solution>
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use slidewise_common::format::read_solution_file;
use slidewise_common::solution::score_photo_groups;
use slidewise_common::Catalog;
use std::path::PathBuf;
use tracing::info;

/// Solution scoring utility
#[derive(Parser, Debug)]
#[command(name = "score-solution")]
#[command(about = "Validate a slideshow solution file and print its score")]
struct Args {
    /// Photo catalog the solution was built from
    catalog: PathBuf,

    /// Solution file to score
    solution: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog = Catalog::from_path(&args.catalog)
        .with_context(|| format!("Failed to read catalog {}", args.catalog.display()))?;
    let groups = read_solution_file(&args.solution)
        .with_context(|| format!("Failed to read solution {}", args.solution.display()))?;
    info!("Loaded {} photos and {} slides", catalog.len(), groups.len());

    let score = score_photo_groups(&catalog, &groups).context("Invalid solution")?;
    println!("{} slides, score {}", groups.len(), score);
    Ok(())
}
