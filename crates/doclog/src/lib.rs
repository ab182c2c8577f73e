//! doclog library
//!
//! This module exports the digest model, the change aggregator and the
//! configuration surface for use by the binary and integration tests.
//!
//! # Example
//!
//! ```no_run
//! use doclog::config::Config;
//! use doclog::run_pipeline;
//! use doclog_docs::FrontMatterReader;
//! use doclog_git::GitCli;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let git = GitCli::discover(".")?.with_timeout(config.git_timeout());
//! let today = chrono::Local::now().date_naive();
//! let options = config.aggregate_options(git.workdir(), today)?;
//!
//! let report = run_pipeline(&git, &FrontMatterReader, &options).await?;
//! println!("{}", serde_json::to_string_pretty(&report.digest)?);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod digest;
pub mod period;

pub use aggregate::{
    AggregateError, AggregateOptions, ChangeAggregator, PassStats, PipelineReport, run_pipeline,
};
pub use digest::{Bucket, ChangelogEntry, Digest, FeedItem};
