// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! History query execution
//!
//! [`HistoryQuery`] is the seam between the aggregator and the version-control
//! tool. [`GitCli`] implements it by running `git log` directly (no shell) with
//! a timeout and a ceiling on captured output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use git2::Repository;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::commit::ChangeCategory;
use crate::error::GitError;
use crate::parser::PRETTY_FORMAT;

/// Default process timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ceiling on captured stdout (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 10240;

/// Ceiling on captured stderr; diagnostics beyond this are dropped
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Parameters of one history query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Only include commits on or after this date
    pub since: NaiveDate,
    /// Which diff status to select for
    pub category: ChangeCategory,
    /// File extension to restrict the query to, without the dot
    pub extension: String,
}

impl HistoryRequest {
    /// Create a request for markdown files
    #[must_use]
    pub fn new(since: NaiveDate, category: ChangeCategory) -> Self {
        Self {
            since,
            category,
            extension: "md".to_string(),
        }
    }

    /// Restrict to a different file extension
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Argument vector for `git`, one flag per element
    #[must_use]
    pub fn git_args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            "core.quotePath=false".to_string(),
            "log".to_string(),
            "-m".to_string(),
            "--first-parent".to_string(),
            "--remove-empty".to_string(),
            "--numstat".to_string(),
            "--date=local".to_string(),
            format!("--since={}", self.since.format("%Y-%m-%d")),
            format!("--diff-filter={}", self.category.diff_filter()),
            format!("--pretty=format:{PRETTY_FORMAT}"),
            "--".to_string(),
            format!("*.{}", self.extension),
        ]
    }
}

/// Source of raw history text
#[async_trait]
pub trait HistoryQuery: Send + Sync {
    /// Run the query and return its raw line-oriented output
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the query cannot be run or fails.
    async fn run(&self, request: &HistoryRequest) -> Result<String, GitError>;
}

/// Runs history queries with the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
    binary: String,
    timeout: Duration,
    max_output_bytes: usize,
}

impl GitCli {
    /// Create a runner for the given working directory
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            binary: "git".to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Discover the repository containing `path` and run in its working tree
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found or
    /// the repository is bare.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let not_found = || GitError::RepositoryNotFound {
            path: path.display().to_string(),
        };
        let repo = Repository::discover(path).map_err(|_| not_found())?;
        let workdir = repo.workdir().ok_or_else(not_found)?;
        // libgit2 reports the working tree with a trailing separator
        Ok(Self::new(workdir.components().collect::<PathBuf>()))
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    /// Set the process timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stdout ceiling in bytes
    #[must_use]
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Working directory the queries run in
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn collect(&self, args: &[String]) -> Result<String, GitError> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::GitNotFound {
                        binary: self.binary.clone(),
                    }
                } else {
                    GitError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            GitError::Io(std::io::Error::other("stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            GitError::Io(std::io::Error::other("stderr was not captured"))
        })?;

        // Each reader is dropped once its cap is hit, which closes the pipe
        // and lets an over-producing git exit instead of blocking.
        let (out, err) = tokio::join!(
            read_capped(stdout, self.max_output_bytes),
            read_capped(stderr, MAX_STDERR_BYTES),
        );
        let out = out?;
        let err = err?;

        if out.len() > self.max_output_bytes {
            let _ = child.start_kill();
            return Err(GitError::OutputTooLarge {
                limit: self.max_output_bytes,
            });
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(GitError::CommandFailed {
                exit_code: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[async_trait]
impl HistoryQuery for GitCli {
    async fn run(&self, request: &HistoryRequest) -> Result<String, GitError> {
        let args = request.git_args();
        info!(
            category = %request.category,
            since = %request.since,
            workdir = %self.workdir.display(),
            "Running history query"
        );

        let output = tokio::time::timeout(self.timeout, self.collect(&args))
            .await
            .map_err(|_| GitError::TimedOut {
                seconds: self.timeout.as_secs(),
            })??;

        debug!(bytes = output.len(), "History query finished");
        Ok(output)
    }
}

/// Read at most `limit + 1` bytes so the caller can tell the limit was exceeded
async fn read_capped<R>(reader: R, limit: usize) -> Result<Vec<u8>, GitError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(cap).read_to_end(&mut buf).await?;
    Ok(buf)
}
