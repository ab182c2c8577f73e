// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for doclog-docs

use thiserror::Error;

/// Errors that can occur while reading document metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The front matter block is not valid YAML
    #[error("Invalid front matter: {0}")]
    InvalidYaml(String),
}

impl From<serde_yaml::Error> for MetadataError {
    fn from(err: serde_yaml::Error) -> Self {
        MetadataError::InvalidYaml(err.to_string())
    }
}

/// Errors that can occur while deriving a public URL
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The documentation folder does not occur in the path
    #[error("Documentation folder '{doc_folder}' not found in {path}")]
    DocFolderNotFound {
        /// The path that was searched
        path: String,
        /// The folder token that was looked for
        doc_folder: String,
    },

    /// No documentation folder was configured
    #[error("Documentation folder name is empty")]
    EmptyDocFolder,
}
