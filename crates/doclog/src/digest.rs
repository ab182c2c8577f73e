// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The bucketed changelog digest
//!
//! A [`Digest`] maps bucket keys (formatted commit dates) to the new and
//! updated articles surfaced in that period. Buckets keep the order they were
//! first referenced in, and entries keep the order they were appended in; both
//! renderers (page template and feed) rely on that order.
//!
//! Serialised, a digest looks like:
//!
//! ```json
//! {
//!   "October 2026": {
//!     "new": [{ "title": "...", "docsUrl": "...", "commitId": "1945ab9", ... }],
//!     "updated": []
//!   }
//! }
//! ```

use chrono::{DateTime, FixedOffset};
use doclog_git::ChangeCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One surfaced article change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    /// Title from the article's front matter
    pub title: Option<String>,
    /// Description from the article's front matter
    pub description: Option<String>,
    /// Lines added by the commit
    pub lines_added: u64,
    /// Lines removed by the commit
    pub lines_removed: u64,
    /// Abbreviated commit hash
    pub commit_id: String,
    /// Link to the commit in the repository host
    pub commit_url: String,
    /// Public documentation URL of the article
    pub docs_url: String,
    /// Absolute path of the source file
    pub absolute_path: String,
    /// Commit time, in the bucketing timezone
    pub published_at: DateTime<FixedOffset>,
}

/// Entries for one time bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Articles added in this period
    #[serde(rename = "new")]
    pub new_entries: Vec<ChangelogEntry>,
    /// Articles updated in this period
    #[serde(rename = "updated")]
    pub updated_entries: Vec<ChangelogEntry>,
}

impl Bucket {
    /// Entries of one category
    #[must_use]
    pub fn entries(&self, category: ChangeCategory) -> &[ChangelogEntry] {
        match category {
            ChangeCategory::New => &self.new_entries,
            ChangeCategory::Updated => &self.updated_entries,
        }
    }

    /// Append an entry to one category
    pub fn push(&mut self, category: ChangeCategory, entry: ChangelogEntry) {
        match category {
            ChangeCategory::New => self.new_entries.push(entry),
            ChangeCategory::Updated => self.updated_entries.push(entry),
        }
    }

    /// Check whether `absolute_path` is already listed as updated
    #[must_use]
    pub fn has_updated(&self, absolute_path: &str) -> bool {
        self.updated_entries
            .iter()
            .any(|e| e.absolute_path == absolute_path)
    }

    /// Total entries across both categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.new_entries.len() + self.updated_entries.len()
    }

    /// Check whether the bucket has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket key to entries, in first-reference order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest {
    buckets: IndexMap<String, Bucket>,
}

impl Digest {
    /// Create an empty digest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `key`, created empty on first reference
    pub fn bucket_mut(&mut self, key: &str) -> &mut Bucket {
        self.buckets.entry(key.to_string()).or_default()
    }

    /// Bucket for `key`, if it has been referenced
    #[must_use]
    pub fn bucket(&self, key: &str) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    /// Buckets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket)> {
        self.buckets.iter().map(|(k, b)| (k.as_str(), b))
    }

    /// Bucket keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Number of buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check whether no bucket has been referenced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total entries across all buckets and categories
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }

    /// Flatten into the item sequence a syndication feed is built from
    ///
    /// Buckets are visited in insertion order; within a bucket new entries
    /// come before updated ones.
    #[must_use]
    pub fn feed_items(&self) -> Vec<FeedItem> {
        self.buckets
            .values()
            .flat_map(|bucket| {
                ChangeCategory::ALL.into_iter().flat_map(move |category| {
                    bucket
                        .entries(category)
                        .iter()
                        .map(move |entry| FeedItem::from_entry(entry, category))
                })
            })
            .collect()
    }
}

/// One syndication feed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Article title
    pub title: Option<String>,
    /// Article description
    pub description: Option<String>,
    /// Public article URL
    pub url: String,
    /// Whether the article is new or updated
    pub category: ChangeCategory,
    /// Publication time
    pub date: DateTime<FixedOffset>,
}

impl FeedItem {
    fn from_entry(entry: &ChangelogEntry, category: ChangeCategory) -> Self {
        Self {
            title: entry.title.clone(),
            description: entry.description.clone(),
            url: entry.docs_url.clone(),
            category,
            date: entry.published_at,
        }
    }
}
