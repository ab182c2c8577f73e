// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! doclog-git: Git history querying for doclog
//!
//! This library crate runs `git log --numstat` for a change category and
//! parses its output into commit groups for the doclog aggregator.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use doclog_git::{ChangeCategory, GitCli, HistoryQuery, HistoryRequest, parse_log};
//!
//! # async fn demo() -> Result<(), doclog_git::GitError> {
//! let git = GitCli::discover(".")?;
//! let since = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
//! let raw = git.run(&HistoryRequest::new(since, ChangeCategory::Updated)).await?;
//!
//! for group in parse_log(&raw)? {
//!     println!("{} touched {} files", group.header.id, group.changes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod commit;
pub mod error;
pub mod parser;
pub mod query;

pub use commit::{ChangeCategory, CommitGroup, CommitHeader, FileChangeRecord};
pub use error::GitError;
pub use parser::{LogParser, parse_log};
pub use query::{GitCli, HistoryQuery, HistoryRequest};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{ChangeCategory, CommitGroup, CommitHeader, FileChangeRecord};
    pub use crate::error::GitError;
    pub use crate::parser::parse_log;
    pub use crate::query::{GitCli, HistoryQuery, HistoryRequest};
}
