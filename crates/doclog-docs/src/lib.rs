// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! doclog-docs: Document-side helpers for doclog
//!
//! This library crate decides which documentation files are excluded from a
//! changelog, derives their public URLs, and reads their front matter.
//!
//! # Example
//!
//! ```
//! use doclog_docs::{ExclusionFilter, LinkResolver, parse_front_matter};
//!
//! let filter = ExclusionFilter::new(["includes/"]);
//! assert!(filter.is_excluded("/repo/docs/includes/note.md"));
//!
//! let links = LinkResolver::new("docs", "https://learn.example.com");
//! assert_eq!(links.resolve("/repo/docs/guide/index.md").unwrap(), "https://learn.example.com/guide");
//!
//! let meta = parse_front_matter("---\ntitle: Guide\n---\n").unwrap();
//! assert_eq!(meta.title.as_deref(), Some("Guide"));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod exclusion;
pub mod link;
pub mod metadata;

pub use error::{LinkError, MetadataError};
pub use exclusion::{ExclusionFilter, is_excluded};
pub use link::{LinkResolver, resolve_public_url};
pub use metadata::{
    DocumentMetadata, FrontMatterReader, MetadataReader, extract_front_matter, parse_front_matter,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::exclusion::ExclusionFilter;
    pub use crate::link::LinkResolver;
    pub use crate::metadata::{DocumentMetadata, FrontMatterReader, MetadataReader};
}
