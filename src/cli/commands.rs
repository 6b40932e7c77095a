//! Command implementations

use super::{CombinedCli, CommonArgs, SingleCli};
use crate::aggregate::{Aggregator, COMBINED_OUTPUT, SINGLE_OUTPUT};
use crate::config::{Config, FailurePolicy};
use crate::progress::TracingProgress;
use crate::repo::GitFetcher;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the default level unless `--verbose` is given.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolve the run configuration, applying command-line overrides
pub fn load_config(common: &CommonArgs) -> Result<Config> {
    let mut config =
        Config::resolve(common.config.as_deref()).context("Failed to load configuration")?;
    if common.keep_going {
        config.on_error = FailurePolicy::Skip;
    }
    Ok(config)
}

/// Clone one repository and flatten its documentation files
pub fn single(cli: &SingleCli) -> Result<()> {
    let config = load_config(&cli.common)?;
    let output = cli
        .common
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(SINGLE_OUTPUT));

    let fetcher = GitFetcher::new();
    let progress = TracingProgress;
    let summary = Aggregator::new(&config, &fetcher, &progress)
        .single_repo(&cli.repository_url, &output)
        .with_context(|| format!("Failed to collect documentation from {}", cli.repository_url))?;

    println!(
        "✓ Combined documentation saved to {} ({} file(s))",
        output.display(),
        summary.emitted
    );
    if summary.skipped > 0 {
        println!("  Skipped {} unreadable file(s)", summary.skipped);
    }

    Ok(())
}

/// Clone a docs repository and a library repository and merge both dumps
pub fn combined(cli: &CombinedCli) -> Result<()> {
    let config = load_config(&cli.common)?;
    let output = cli
        .common
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(COMBINED_OUTPUT));

    let fetcher = GitFetcher::new();
    let progress = TracingProgress;
    let summary = Aggregator::new(&config, &fetcher, &progress)
        .docs_and_library(
            &cli.docs_repository_url,
            &cli.library_repository_url,
            &output,
        )
        .with_context(|| {
            format!(
                "Failed to combine {} and {}",
                cli.docs_repository_url, cli.library_repository_url
            )
        })?;

    println!("✓ Combined documentation saved to {}", output.display());
    println!("  Markdown files: {}", summary.docs.emitted);
    println!("  Toctree placeholders excluded: {}", summary.docs.excluded);
    println!(
        "  Docstrings: {} from {} source file(s)",
        summary.docstrings.records, summary.docstrings.files
    );
    let skipped = summary.docs.skipped + summary.docstrings.skipped;
    if skipped > 0 {
        println!("  Skipped {} unreadable file(s)", skipped);
    }

    Ok(())
}
