// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Front matter metadata for documentation files
//!
//! Only `title` and `description` are read; other keys are ignored. A file
//! without a front matter block yields empty metadata rather than an error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::MetadataError;

/// Line that opens and closes a front matter block
const DELIMITER: &str = "---";

/// Title and description read from a document header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document description
    pub description: Option<String>,
}

impl DocumentMetadata {
    /// Check whether neither field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Source of per-file metadata
pub trait MetadataReader: Send + Sync {
    /// Read metadata for the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Io` if the file cannot be read, or
    /// `MetadataError::InvalidYaml` if its header block cannot be parsed.
    fn read(&self, path: &Path) -> Result<DocumentMetadata, MetadataError>;
}

/// Reads YAML front matter from the start of a file
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterReader;

impl MetadataReader for FrontMatterReader {
    fn read(&self, path: &Path) -> Result<DocumentMetadata, MetadataError> {
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Read document");
        parse_front_matter(&content)
    }
}

/// Return the YAML text between the opening and closing `---` lines
///
/// Returns `None` if the content does not open with a front matter block or
/// the block is never closed.
#[must_use]
pub fn extract_front_matter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let opening = lines.next()?;
    if opening.trim_end() != DELIMITER {
        return None;
    }

    let start = opening.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Some(&content[start..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse title and description from file content
///
/// # Errors
///
/// Returns `MetadataError::InvalidYaml` if a front matter block exists but
/// is not valid YAML.
pub fn parse_front_matter(content: &str) -> Result<DocumentMetadata, MetadataError> {
    let Some(yaml) = extract_front_matter(content) else {
        return Ok(DocumentMetadata::default());
    };

    let value: Value = serde_yaml::from_str(yaml)?;
    let Value::Mapping(map) = value else {
        return Ok(DocumentMetadata::default());
    };

    Ok(DocumentMetadata {
        title: map.get("title").and_then(scalar_to_string),
        description: map.get("description").and_then(scalar_to_string),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
