//! doclog: changelog of new and updated documentation
//!
//! This binary reads the git history of a documentation repository and prints
//! the bucketed digest (or its feed items) as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use doclog::config::Config;
use doclog::run_pipeline;
use doclog_docs::FrontMatterReader;
use doclog_git::GitCli;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries only JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .with_writer(std::io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let workspace = config
        .workspace_path()
        .context("Cannot determine the workspace directory")?;
    let git = GitCli::discover(&workspace)
        .with_context(|| format!("No git repository at {}", workspace.display()))?
        .with_timeout(config.git_timeout())
        .with_max_output_bytes(config.max_output_bytes);

    let today = chrono::Local::now().date_naive();
    let options = config.aggregate_options(git.workdir(), today)?;
    info!(
        workspace = %git.workdir().display(),
        since = %options.since,
        "Building documentation changelog"
    );

    let report = run_pipeline(&git, &FrontMatterReader, &options)
        .await
        .context("Failed to build the changelog")?;

    for pass in &report.passes {
        info!(
            category = %pass.category,
            added = pass.added,
            skipped = pass.skipped(),
            "Pass summary"
        );
    }
    for (key, bucket) in report.digest.iter() {
        debug!(
            bucket = key,
            new = bucket.new_entries.len(),
            updated = bucket.updated_entries.len(),
            "Bucket summary"
        );
    }

    let json = if config.feed {
        serde_json::to_string_pretty(&report.digest.feed_items())?
    } else {
        serde_json::to_string_pretty(&report.digest)?
    };
    println!("{json}");

    Ok(())
}
