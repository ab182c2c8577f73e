// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit and file-change types produced by the log parser

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token numstat prints instead of a line count for binary files
pub const BINARY_MARKER: &str = "-";

/// One commit header line from the history query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitHeader {
    /// Abbreviated commit hash
    pub id: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp in seconds since the Unix epoch
    pub timestamp_epoch: i64,
}

impl CommitHeader {
    /// Author timestamp as a UTC date-time
    ///
    /// Returns `None` if the epoch value is outside chrono's representable range.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp_epoch, 0)
    }
}

/// One file touched by a commit, as reported by `--numstat`
///
/// Line counts are kept as the raw tokens git printed. Binary files report
/// [`BINARY_MARKER`] for both, so interpretation is left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeRecord {
    /// Raw added-lines token
    pub lines_added: String,
    /// Raw removed-lines token
    pub lines_removed: String,
    /// Path relative to the repository root
    pub relative_path: String,
}

impl FileChangeRecord {
    /// Added lines, if the token is numeric
    #[must_use]
    pub fn added(&self) -> Option<u64> {
        self.lines_added.parse().ok()
    }

    /// Removed lines, if the token is numeric
    #[must_use]
    pub fn removed(&self) -> Option<u64> {
        self.lines_removed.parse().ok()
    }

    /// Net line change (`added - removed`)
    ///
    /// `None` when either count is non-numeric (binary files).
    #[must_use]
    pub fn net_change(&self) -> Option<i64> {
        let added = i64::try_from(self.added()?).ok()?;
        let removed = i64::try_from(self.removed()?).ok()?;
        Some(added - removed)
    }

    /// Check whether git reported this file as binary
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.lines_added == BINARY_MARKER && self.lines_removed == BINARY_MARKER
    }
}

/// A commit header together with the file changes listed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGroup {
    /// The commit
    pub header: CommitHeader,
    /// Files touched by the commit, in output order
    pub changes: Vec<FileChangeRecord>,
}

impl CommitGroup {
    /// Start a group with no file changes yet
    #[must_use]
    pub fn new(header: CommitHeader) -> Self {
        Self {
            header,
            changes: Vec::new(),
        }
    }
}

/// Kind of change a history query selects for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    /// Files added in the commit
    New,
    /// Files modified in the commit
    Updated,
}

impl ChangeCategory {
    /// Both categories, in the order the pipeline processes them
    pub const ALL: [ChangeCategory; 2] = [ChangeCategory::New, ChangeCategory::Updated];

    /// The `--diff-filter` status letter for this category
    #[must_use]
    pub fn diff_filter(self) -> char {
        match self {
            Self::New => 'A',
            Self::Updated => 'M',
        }
    }

    /// Lowercase name used in output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
