//! Configuration for the doclog binary
//!
//! This module provides the command-line surface and its conversion into the
//! typed [`AggregateOptions`] the aggregator runs with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use doclog_docs::{ExclusionFilter, LinkResolver};
use doclog_git::query::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};

use crate::aggregate::{
    AggregateOptions, DEFAULT_DOC_FOLDER, DEFAULT_DOCS_URL, DEFAULT_EXCLUSIONS,
    DEFAULT_MIN_CHANGED_LINES, DEFAULT_REPO_URL,
};
use crate::period::{BucketTimezone, DEFAULT_DATE_FORMAT, DateFormat, PeriodError, since_date};

/// Default lookback in calendar months
pub const DEFAULT_MONTHS_AGO: u32 = 3;

/// Default git timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();

/// doclog - build a changelog of new and updated documentation from git history
#[derive(Parser, Debug, Clone)]
#[command(name = "doclog")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Repository working directory
    ///
    /// Any directory inside the repository works; the repository root is
    /// discovered from it. Defaults to the current working directory.
    #[arg(short, long, env = "DOCLOG_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// How many calendar months of history to include
    ///
    /// History starts on the first day of the month this many months ago.
    #[arg(long, env = "DOCLOG_MONTHS_AGO", default_value_t = DEFAULT_MONTHS_AGO)]
    pub months_ago: u32,

    /// Net line change an article must exceed to be listed
    #[arg(long, env = "DOCLOG_MIN_CHANGED_LINES", default_value_t = DEFAULT_MIN_CHANGED_LINES)]
    pub min_changed_lines: i64,

    /// Path substrings to leave out (repeatable, comma-delimited)
    #[arg(
        long = "exclude",
        env = "DOCLOG_EXCLUDE",
        value_delimiter = ',',
        default_values = DEFAULT_EXCLUSIONS
    )]
    pub exclude: Vec<String>,

    /// strftime pattern used to group commits into buckets
    #[arg(long, env = "DOCLOG_DATE_FORMAT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Bucket commit times in UTC instead of the local timezone
    #[arg(long, env = "DOCLOG_UTC", default_value = "false")]
    pub utc: bool,

    /// Folder name that marks the documentation root in a path
    #[arg(long, env = "DOCLOG_DOC_FOLDER", default_value = DEFAULT_DOC_FOLDER)]
    pub doc_folder: String,

    /// Public documentation site that article URLs are built on
    #[arg(long, env = "DOCLOG_DOCS_URL", default_value = DEFAULT_DOCS_URL)]
    pub docs_url: String,

    /// Repository URL that commit links are built on
    #[arg(long, env = "DOCLOG_REPO_URL", default_value = DEFAULT_REPO_URL)]
    pub repo_url: String,

    /// File extension of documentation sources
    #[arg(long, env = "DOCLOG_EXTENSION", default_value = "md")]
    pub extension: String,

    /// Seconds to wait for each git query
    #[arg(long, env = "DOCLOG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum bytes of git output to accept per query
    #[arg(long, env = "DOCLOG_MAX_OUTPUT_BYTES", default_value_t = DEFAULT_MAX_OUTPUT_BYTES)]
    pub max_output_bytes: usize,

    /// Print feed items instead of the bucketed digest
    #[arg(long, env = "DOCLOG_FEED", default_value = "false")]
    pub feed: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so stdout carries only the JSON output.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            months_ago: DEFAULT_MONTHS_AGO,
            min_changed_lines: DEFAULT_MIN_CHANGED_LINES,
            exclude: DEFAULT_EXCLUSIONS.map(String::from).to_vec(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc: false,
            doc_folder: DEFAULT_DOC_FOLDER.to_string(),
            docs_url: DEFAULT_DOCS_URL.to_string(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            extension: "md".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            feed: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Get the workspace path, using current directory as default
    ///
    /// Returns `None` if no workspace is specified and the current
    /// directory cannot be determined.
    #[must_use]
    pub fn workspace_path(&self) -> Option<PathBuf> {
        self.workspace
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The workspace path is specified but doesn't exist
    /// - The workspace path is not a directory
    /// - The date format is not a valid strftime pattern
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref workspace) = self.workspace {
            if !workspace.exists() {
                return Err(ConfigError::WorkspaceNotFound(workspace.clone()));
            }
            if !workspace.is_dir() {
                return Err(ConfigError::WorkspaceNotDirectory(workspace.clone()));
            }
        }

        self.bucket_format()?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// The validated bucket format
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Period` if the pattern is invalid.
    pub fn bucket_format(&self) -> Result<DateFormat, ConfigError> {
        Ok(DateFormat::new(&self.date_format)?)
    }

    /// Timezone buckets are computed in
    #[must_use]
    pub fn timezone(&self) -> BucketTimezone {
        if self.utc {
            BucketTimezone::Utc
        } else {
            BucketTimezone::Local
        }
    }

    /// Exclusion patterns, with empty entries dropped
    #[must_use]
    pub fn exclusions(&self) -> ExclusionFilter {
        ExclusionFilter::new(
            self.exclude
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty()),
        )
    }

    /// Timeout for each git query
    #[must_use]
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build aggregation options for a repository root
    ///
    /// `today` anchors the lookback window.
    ///
    /// # Errors
    ///
    /// Returns an error if the date format is invalid or the lookback
    /// underflows the calendar.
    pub fn aggregate_options(
        &self,
        workspace_root: &Path,
        today: NaiveDate,
    ) -> Result<AggregateOptions, ConfigError> {
        Ok(AggregateOptions {
            workspace_root: workspace_root.to_path_buf(),
            since: since_date(today, self.months_ago)?,
            date_format: self.bucket_format()?,
            timezone: self.timezone(),
            min_changed_lines: self.min_changed_lines,
            exclusions: self.exclusions(),
            repo_url: self.repo_url.trim_end_matches('/').to_string(),
            links: LinkResolver::new(self.doc_folder.as_str(), self.docs_url.as_str()),
            extension: self.extension.trim_start_matches('.').to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Workspace path not found
    #[error("Workspace path not found: {0}")]
    WorkspaceNotFound(PathBuf),

    /// Workspace path is not a directory
    #[error("Workspace path is not a directory: {0}")]
    WorkspaceNotDirectory(PathBuf),

    /// Bucket format or lookback is invalid
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// A zero timeout would fail every query
    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.workspace.is_none());
        assert_eq!(config.months_ago, 3);
        assert_eq!(config.min_changed_lines, 5);
        assert_eq!(config.date_format, "%B %Y");
        assert!(!config.utc);
        assert!(!config.feed);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_parse_without_arguments_matches_default() {
        let parsed = Config::try_parse_from(["doclog"]).expect("should parse");
        let default = Config::default();
        assert_eq!(parsed.months_ago, default.months_ago);
        assert_eq!(parsed.min_changed_lines, default.min_changed_lines);
        assert_eq!(parsed.exclude, default.exclude);
        assert_eq!(parsed.doc_folder, default.doc_folder);
        assert_eq!(parsed.docs_url, default.docs_url);
        assert_eq!(parsed.repo_url, default.repo_url);
        assert_eq!(parsed.max_output_bytes, 10_485_760);
        assert_eq!(parsed.git_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_exclude_is_comma_delimited_and_repeatable() {
        let config =
            Config::try_parse_from(["doclog", "--exclude", "drafts/,archive/", "--exclude", "tmp/"])
                .expect("should parse");
        assert_eq!(config.exclude, vec!["drafts/", "archive/", "tmp/"]);
    }

    #[test]
    fn test_empty_exclusions_dropped() {
        let config = Config {
            exclude: vec![String::new(), "build/".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert_eq!(config.exclusions().patterns().to_vec(), vec!["build/".to_string()]);
    }

    #[test]
    fn test_workspace_path_default() {
        let config = Config::default();
        // Should fallback to current directory
        assert!(config.workspace_path().is_some());
    }

    #[test]
    fn test_workspace_path_custom() {
        let custom = PathBuf::from("/tmp");
        let config = Config {
            workspace: Some(custom.clone()),
            ..Default::default()
        };
        assert_eq!(config.workspace_path(), Some(custom));
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(Config::default().log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_workspace() {
        let config = Config {
            workspace: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WorkspaceNotFound(_))
        ));
    }

    #[test]
    fn test_validate_valid_workspace() {
        let config = Config {
            workspace: Some(std::env::temp_dir()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_date_format() {
        let config = Config {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Period(PeriodError::InvalidDateFormat(_)))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_aggregate_options() {
        let config = Config {
            months_ago: 2,
            min_changed_lines: 10,
            utc: true,
            repo_url: "https://github.com/org/docs/".to_string(),
            extension: ".rst".to_string(),
            ..Default::default()
        };
        let options = config
            .aggregate_options(Path::new("/work/repo"), today())
            .expect("should build options");

        assert_eq!(options.workspace_root, PathBuf::from("/work/repo"));
        assert_eq!(options.since, NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid"));
        assert_eq!(options.min_changed_lines, 10);
        assert_eq!(options.timezone, BucketTimezone::Utc);
        assert_eq!(options.repo_url, "https://github.com/org/docs");
        assert_eq!(options.extension, "rst");
        assert_eq!(options.links.doc_folder(), "docs");
        assert_eq!(options.links.public_base_url(), "https://docs.microsoft.com");
    }

    #[test]
    fn test_aggregate_options_lookback_underflow() {
        let config = Config {
            months_ago: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.aggregate_options(Path::new("/work/repo"), today()),
            Err(ConfigError::Period(PeriodError::InvalidLookback(_)))
        ));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
