// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Path exclusion by literal substring
//!
//! Patterns are plain substrings, not globs: `"index.md"` excludes
//! `docs/browse/index.md` and also `docs/reindex.md`.

use serde::{Deserialize, Serialize};

/// Check whether `path` contains any of `patterns`
///
/// An empty pattern list excludes nothing.
#[must_use]
pub fn is_excluded<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| path.contains(p.as_ref()))
}

/// A configured set of exclusion patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    /// Build a filter from substring patterns
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether `path` is excluded
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        is_excluded(path, &self.patterns)
    }

    /// First pattern that excludes `path`, for logging
    #[must_use]
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|p| path.contains(p))
    }

    /// The configured patterns
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
