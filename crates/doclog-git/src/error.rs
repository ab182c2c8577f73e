// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for doclog-git

use thiserror::Error;

/// Errors that can occur while querying or parsing git history
#[derive(Debug, Error)]
pub enum GitError {
    /// Log output does not follow the header/numstat protocol
    #[error("Malformed history at line {line}: {reason}")]
    MalformedHistory {
        /// 1-based line number in the raw output
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// git exited with a non-zero status
    #[error("git exited with status {exit_code}: {stderr}")]
    CommandFailed {
        /// Process exit code (-1 if killed by a signal)
        exit_code: i32,
        /// Diagnostic output captured from stderr
        stderr: String,
    },

    /// git did not finish within the configured timeout
    #[error("git did not finish within {seconds}s")]
    TimedOut {
        /// The timeout that elapsed
        seconds: u64,
    },

    /// git produced more output than the configured ceiling
    #[error("git output exceeded {limit} bytes")]
    OutputTooLarge {
        /// The ceiling in bytes
        limit: usize,
    },

    /// The git executable could not be found
    #[error("git executable not found: {binary}")]
    GitNotFound {
        /// The binary that was looked up
        binary: String,
    },

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// I/O error while talking to the git process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHistory {
            line,
            reason: reason.into(),
        }
    }
}
