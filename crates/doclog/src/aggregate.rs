// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Change aggregation
//!
//! This module turns history query output into a [`Digest`]. Each category
//! pass queries git, parses the numstat log, filters the file changes and
//! appends the survivors to the shared digest. The `new` pass always runs
//! before the `updated` pass, and both mutate the same digest.
//!
//! # Example
//!
//! ```no_run
//! use doclog::aggregate::{AggregateOptions, run_pipeline};
//! use doclog_docs::FrontMatterReader;
//! use doclog_git::GitCli;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let git = GitCli::discover(".")?;
//! let options = AggregateOptions::new(git.workdir(), chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
//! let report = run_pipeline(&git, &FrontMatterReader, &options).await?;
//! println!("{} articles in {} buckets", report.digest.entry_count(), report.digest.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use doclog_docs::{DocumentMetadata, ExclusionFilter, LinkResolver, MetadataError, MetadataReader};
use doclog_git::{
    ChangeCategory, CommitGroup, CommitHeader, FileChangeRecord, GitError, HistoryQuery,
    HistoryRequest, parse_log,
};

use crate::digest::{ChangelogEntry, Digest};
use crate::period::{BucketTimezone, DateFormat};

// ============================================================================
// Error Types
// ============================================================================

/// Aggregation errors
///
/// Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The history query could not be run or failed
    #[error("History query for {category} articles failed: {source}")]
    Query {
        /// The category whose query failed
        category: ChangeCategory,
        /// Underlying git error
        #[source]
        source: GitError,
    },

    /// The history query output broke the log protocol
    #[error("History for {category} articles could not be parsed: {source}")]
    Parse {
        /// The category whose output was malformed
        category: ChangeCategory,
        /// Underlying parse error
        #[source]
        source: GitError,
    },

    /// A commit timestamp cannot be represented as a date
    #[error("Commit {commit} in the {category} history has an out-of-range timestamp: {epoch}")]
    TimestampOutOfRange {
        /// The category whose history held the commit
        category: ChangeCategory,
        /// The commit id
        commit: String,
        /// The raw epoch seconds
        epoch: i64,
    },
}

impl AggregateError {
    /// The category whose pass failed, if the failure is tied to one
    #[must_use]
    pub fn category(&self) -> Option<ChangeCategory> {
        match self {
            Self::Query { category, .. }
            | Self::Parse { category, .. }
            | Self::TimestampOutOfRange { category, .. } => Some(*category),
        }
    }
}

// ============================================================================
// Options and Statistics
// ============================================================================

/// Default minimum net line change for an article to be listed
pub const DEFAULT_MIN_CHANGED_LINES: i64 = 5;

/// Default repository URL commit links are built from
pub const DEFAULT_REPO_URL: &str = "https://github.com/changeme";

/// Default documentation folder token
pub const DEFAULT_DOC_FOLDER: &str = "docs";

/// Default public documentation site
pub const DEFAULT_DOCS_URL: &str = "https://docs.microsoft.com";

/// Default path exclusions
pub const DEFAULT_EXCLUSIONS: [&str; 4] = ["build/", "includes/", "browse/index.md", "changelog.md"];

/// Inputs to a category pass
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Repository root that numstat paths are relative to
    pub workspace_root: PathBuf,
    /// Only commits on or after this date are considered
    pub since: NaiveDate,
    /// Pattern bucket keys are formatted with
    pub date_format: DateFormat,
    /// Timezone commit times are bucketed in
    pub timezone: BucketTimezone,
    /// Net line change an article must exceed
    pub min_changed_lines: i64,
    /// Substring exclusions applied to absolute paths
    pub exclusions: ExclusionFilter,
    /// Repository URL; commit links are `<repo_url>/commit/<id>`
    pub repo_url: String,
    /// Public URL derivation
    pub links: LinkResolver,
    /// File extension the history query is restricted to
    pub extension: String,
}

impl AggregateOptions {
    /// Options with the default policy for the given repository and window
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>, since: NaiveDate) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            since,
            date_format: DateFormat::default(),
            timezone: BucketTimezone::default(),
            min_changed_lines: DEFAULT_MIN_CHANGED_LINES,
            exclusions: ExclusionFilter::new(DEFAULT_EXCLUSIONS),
            repo_url: DEFAULT_REPO_URL.to_string(),
            links: LinkResolver::new(DEFAULT_DOC_FOLDER, DEFAULT_DOCS_URL),
            extension: "md".to_string(),
        }
    }

    /// History request for one category
    #[must_use]
    pub fn request(&self, category: ChangeCategory) -> HistoryRequest {
        HistoryRequest::new(self.since, category).with_extension(&self.extension)
    }

    /// Absolute path of a numstat path
    #[must_use]
    pub fn absolute_path(&self, relative_path: &str) -> String {
        format!("{}/{}", self.workspace_root.display(), relative_path)
    }

    /// Commit link for a commit id
    #[must_use]
    pub fn commit_url(&self, commit_id: &str) -> String {
        format!("{}/commit/{}", self.repo_url, commit_id)
    }
}

/// Why a file change was not listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Path matched an exclusion pattern
    Excluded,
    /// Path already listed as updated in the bucket
    Duplicate,
    /// File no longer exists
    Missing,
    /// Net change not above the threshold, or counts non-numeric
    BelowThreshold,
    /// File could not be read
    Unreadable,
    /// No public URL could be derived
    Unlinkable,
}

/// Statistics from one category pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassStats {
    /// The category processed
    pub category: ChangeCategory,
    /// Commit groups parsed
    pub commits: usize,
    /// File change records seen
    pub records: usize,
    /// Entries appended to the digest
    pub added: usize,
    /// Records skipped by exclusion
    pub excluded: usize,
    /// Records skipped as duplicates of an updated entry
    pub duplicates: usize,
    /// Records skipped because the file is gone
    pub missing: usize,
    /// Records skipped by the change-size threshold
    pub below_threshold: usize,
    /// Records skipped because the file could not be read
    pub unreadable: usize,
    /// Records skipped because no public URL could be derived
    pub unlinkable: usize,
}

impl PassStats {
    /// Empty statistics for a category
    #[must_use]
    pub fn new(category: ChangeCategory) -> Self {
        Self {
            category,
            commits: 0,
            records: 0,
            added: 0,
            excluded: 0,
            duplicates: 0,
            missing: 0,
            below_threshold: 0,
            unreadable: 0,
            unlinkable: 0,
        }
    }

    /// Count a skipped record
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Excluded => self.excluded += 1,
            SkipReason::Duplicate => self.duplicates += 1,
            SkipReason::Missing => self.missing += 1,
            SkipReason::BelowThreshold => self.below_threshold += 1,
            SkipReason::Unreadable => self.unreadable += 1,
            SkipReason::Unlinkable => self.unlinkable += 1,
        }
    }

    /// Total skipped records
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.excluded
            + self.duplicates
            + self.missing
            + self.below_threshold
            + self.unreadable
            + self.unlinkable
    }
}

/// Result of running both category passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// The finished digest
    pub digest: Digest,
    /// Statistics per pass, in run order
    pub passes: Vec<PassStats>,
}

// ============================================================================
// Aggregator
// ============================================================================

/// Builds digest entries from history queries
pub struct ChangeAggregator<'a> {
    query: &'a dyn HistoryQuery,
    metadata: &'a dyn MetadataReader,
    options: &'a AggregateOptions,
}

impl<'a> ChangeAggregator<'a> {
    /// Create an aggregator over a history source and metadata reader
    #[must_use]
    pub fn new(
        query: &'a dyn HistoryQuery,
        metadata: &'a dyn MetadataReader,
        options: &'a AggregateOptions,
    ) -> Self {
        Self {
            query,
            metadata,
            options,
        }
    }

    /// Run one category pass, appending to `digest`
    ///
    /// # Errors
    ///
    /// Returns an error if the history query fails, its output is malformed,
    /// or a commit timestamp is out of range. The digest may hold entries
    /// from earlier passes but none from the failed one.
    pub async fn aggregate(
        &self,
        digest: &mut Digest,
        category: ChangeCategory,
    ) -> Result<PassStats, AggregateError> {
        info!(%category, since = %self.options.since, "Starting aggregation pass");

        let raw = self
            .query
            .run(&self.options.request(category))
            .await
            .map_err(|source| AggregateError::Query { category, source })?;
        let groups =
            parse_log(&raw).map_err(|source| AggregateError::Parse { category, source })?;

        let mut stats = PassStats::new(category);
        stats.commits = groups.len();

        // Resolve every bucket key before touching the digest so a bad
        // timestamp leaves it unchanged.
        let keyed = groups
            .into_iter()
            .map(|group| self.bucket_key(category, &group.header).map(|key| (key, group)))
            .collect::<Result<Vec<_>, _>>()?;

        for ((key, published_at), group) in keyed {
            self.apply_group(digest, category, &key, published_at, group, &mut stats);
        }

        info!(
            %category,
            commits = stats.commits,
            records = stats.records,
            added = stats.added,
            skipped = stats.skipped(),
            "Aggregation pass complete"
        );
        Ok(stats)
    }

    /// Run the `new` pass then the `updated` pass over one digest
    ///
    /// # Errors
    ///
    /// Returns the first pass failure; see [`aggregate`](Self::aggregate).
    pub async fn run(&self) -> Result<PipelineReport, AggregateError> {
        let mut digest = Digest::new();
        let mut passes = Vec::with_capacity(ChangeCategory::ALL.len());
        for category in ChangeCategory::ALL {
            passes.push(self.aggregate(&mut digest, category).await?);
        }
        Ok(PipelineReport { digest, passes })
    }

    fn bucket_key(
        &self,
        category: ChangeCategory,
        header: &CommitHeader,
    ) -> Result<(String, chrono::DateTime<chrono::FixedOffset>), AggregateError> {
        let utc = header
            .timestamp()
            .ok_or_else(|| AggregateError::TimestampOutOfRange {
                category,
                commit: header.id.clone(),
                epoch: header.timestamp_epoch,
            })?;
        let published_at = self.options.timezone.localize(utc);
        Ok((self.options.date_format.bucket_key(&published_at), published_at))
    }

    fn apply_group(
        &self,
        digest: &mut Digest,
        category: ChangeCategory,
        key: &str,
        published_at: chrono::DateTime<chrono::FixedOffset>,
        group: CommitGroup,
        stats: &mut PassStats,
    ) {
        let bucket = digest.bucket_mut(key);
        for record in &group.changes {
            stats.records += 1;
            let absolute_path = self.options.absolute_path(&record.relative_path);

            // Only the updated list is checked, whichever pass is running
            let duplicate = bucket.has_updated(&absolute_path);
            match self.build_entry(&group.header, record, absolute_path, published_at, duplicate) {
                Ok(entry) => {
                    debug!(%category, bucket = %key, path = %entry.absolute_path, "Listing article");
                    bucket.push(category, entry);
                    stats.added += 1;
                }
                Err(reason) => {
                    debug!(
                        %category,
                        commit = %group.header.id,
                        path = %record.relative_path,
                        ?reason,
                        "Skipping file change"
                    );
                    stats.record_skip(reason);
                }
            }
        }
    }

    fn build_entry(
        &self,
        header: &CommitHeader,
        record: &FileChangeRecord,
        absolute_path: String,
        published_at: chrono::DateTime<chrono::FixedOffset>,
        duplicate: bool,
    ) -> Result<ChangelogEntry, SkipReason> {
        if let Some(pattern) = self.options.exclusions.matching_pattern(&absolute_path) {
            debug!(path = %absolute_path, pattern, "Path excluded");
            return Err(SkipReason::Excluded);
        }
        if duplicate {
            return Err(SkipReason::Duplicate);
        }
        if !Path::new(&absolute_path).exists() {
            return Err(SkipReason::Missing);
        }

        let (Some(lines_added), Some(lines_removed), Some(net)) =
            (record.added(), record.removed(), record.net_change())
        else {
            if record.is_binary() {
                debug!(path = %absolute_path, "Binary change has no line counts");
            }
            return Err(SkipReason::BelowThreshold);
        };
        if net <= self.options.min_changed_lines {
            return Err(SkipReason::BelowThreshold);
        }

        let metadata = self.read_metadata(&absolute_path)?;
        if metadata.is_empty() {
            debug!(path = %absolute_path, "Article has no title or description");
        }

        let docs_url = self.options.links.resolve(&absolute_path).map_err(|e| {
            warn!(path = %absolute_path, error = %e, "No public URL for article");
            SkipReason::Unlinkable
        })?;

        Ok(ChangelogEntry {
            title: metadata.title,
            description: metadata.description,
            lines_added,
            lines_removed,
            commit_id: header.id.clone(),
            commit_url: self.options.commit_url(&header.id),
            docs_url,
            absolute_path,
            published_at,
        })
    }

    fn read_metadata(&self, absolute_path: &str) -> Result<DocumentMetadata, SkipReason> {
        match self.metadata.read(Path::new(absolute_path)) {
            Ok(metadata) => Ok(metadata),
            Err(e @ MetadataError::InvalidYaml(_)) => {
                warn!(path = %absolute_path, error = %e, "Ignoring unparseable front matter");
                Ok(DocumentMetadata::default())
            }
            Err(e @ MetadataError::Io { .. }) => {
                warn!(path = %absolute_path, error = %e, "Skipping unreadable article");
                Err(SkipReason::Unreadable)
            }
        }
    }
}

/// Build a digest by running both category passes in order
///
/// # Errors
///
/// Returns the first pass failure; no partial digest is returned.
pub async fn run_pipeline(
    query: &dyn HistoryQuery,
    metadata: &dyn MetadataReader,
    options: &AggregateOptions,
) -> Result<PipelineReport, AggregateError> {
    ChangeAggregator::new(query, metadata, options).run().await
}
