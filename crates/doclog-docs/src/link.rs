// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Public documentation URLs from source paths

use crate::error::LinkError;

/// Suffix dropped from routes so a folder's index page maps to the folder
const INDEX_SUFFIX: &str = "/index";

/// Derive the public URL of a documentation source file
///
/// The route is everything after the first occurrence of `doc_folder` in
/// `absolute_path`, minus its last `.`-separated segment, minus a trailing
/// `/index`. Routes with no `.` are kept whole.
///
/// ```
/// use doclog_docs::resolve_public_url;
///
/// let url = resolve_public_url("/repo/docs/a/b/index.md", "docs", "https://x").unwrap();
/// assert_eq!(url, "https://x/a/b");
/// ```
///
/// # Errors
///
/// Returns `LinkError::DocFolderNotFound` if `doc_folder` does not occur in
/// `absolute_path`, or `LinkError::EmptyDocFolder` if it is empty.
pub fn resolve_public_url(
    absolute_path: &str,
    doc_folder: &str,
    public_base_url: &str,
) -> Result<String, LinkError> {
    if doc_folder.is_empty() {
        return Err(LinkError::EmptyDocFolder);
    }

    let start = absolute_path
        .find(doc_folder)
        .ok_or_else(|| LinkError::DocFolderNotFound {
            path: absolute_path.to_string(),
            doc_folder: doc_folder.to_string(),
        })?;
    let route = &absolute_path[start + doc_folder.len()..];

    let route = match route.rfind('.') {
        Some(dot) => &route[..dot],
        None => route,
    };
    let route = route.strip_suffix(INDEX_SUFFIX).unwrap_or(route);

    Ok(format!("{public_base_url}{route}"))
}

/// Resolver bound to one documentation folder and public base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
    doc_folder: String,
    public_base_url: String,
}

impl LinkResolver {
    /// Create a resolver
    #[must_use]
    pub fn new(doc_folder: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            doc_folder: doc_folder.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Resolve the public URL for `absolute_path`
    ///
    /// # Errors
    ///
    /// See [`resolve_public_url`].
    pub fn resolve(&self, absolute_path: &str) -> Result<String, LinkError> {
        resolve_public_url(absolute_path, &self.doc_folder, &self.public_base_url)
    }

    /// Documentation folder token
    #[must_use]
    pub fn doc_folder(&self) -> &str {
        &self.doc_folder
    }

    /// Public base URL
    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
