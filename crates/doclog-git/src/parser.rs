// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parsing of `git log --numstat` output
//!
//! The history query asks git for one header line per commit in the
//! [`PRETTY_FORMAT`] layout, followed by the tab-separated numstat lines for
//! the files it touched:
//!
//! ```text
//! commit|1945ab9|Test Author|test@example.com|1768617186
//! 12	3	docs/guide/index.md
//! -	-	docs/images/diagram.png
//! ```
//!
//! # Example
//!
//! ```
//! use doclog_git::parse_log;
//!
//! let raw = "commit|1945ab9|Test Author|test@example.com|1768617186\n12\t3\tdocs/a.md\n";
//! let groups = parse_log(raw).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].changes[0].relative_path, "docs/a.md");
//! ```

use tracing::debug;

use crate::commit::{CommitGroup, CommitHeader, FileChangeRecord};
use crate::error::GitError;

/// Token every header line starts with
pub const HEADER_SENTINEL: &str = "commit";

/// Separator between header fields
pub const FIELD_DELIMITER: char = '|';

/// `--pretty` format producing header lines this parser understands
pub const PRETTY_FORMAT: &str = "commit|%h|%aN|%ae|%at";

/// Incremental parser for numstat log output
///
/// Lines are fed one at a time. A header line opens a new group which stays
/// open, across blank lines, until the next header or [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct LogParser {
    groups: Vec<CommitGroup>,
    current: Option<CommitGroup>,
    line_no: usize,
}

impl LogParser {
    /// Create a parser awaiting its first header
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single line of output
    ///
    /// # Errors
    ///
    /// Returns `GitError::MalformedHistory` if the line is a header with
    /// missing fields, a file-change line appears before any header, or a
    /// file-change line does not have three tab-separated fields.
    pub fn process_line(&mut self, line: &str) -> Result<(), GitError> {
        self.line_no += 1;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return Ok(());
        }

        if is_header(line) {
            let header = parse_header(line, self.line_no)?;
            if let Some(done) = self.current.replace(CommitGroup::new(header)) {
                self.groups.push(done);
            }
            return Ok(());
        }

        let Some(group) = self.current.as_mut() else {
            return Err(GitError::malformed(
                self.line_no,
                "file change before any commit header",
            ));
        };
        group.changes.push(parse_change(line, self.line_no)?);
        Ok(())
    }

    /// Number of completed and in-progress groups seen so far
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len() + usize::from(self.current.is_some())
    }

    /// Close the open group and return every group in input order
    #[must_use]
    pub fn finish(mut self) -> Vec<CommitGroup> {
        if let Some(done) = self.current.take() {
            self.groups.push(done);
        }
        self.groups
    }
}

/// Parse a complete history query output into commit groups
///
/// Groups are returned in the order their headers appear.
///
/// # Errors
///
/// Returns `GitError::MalformedHistory` on the first line that breaks the
/// header/numstat protocol; no partial result is returned.
pub fn parse_log(raw: &str) -> Result<Vec<CommitGroup>, GitError> {
    let mut parser = LogParser::new();
    for line in raw.lines() {
        parser.process_line(line)?;
    }
    debug!(commits = parser.group_count(), "Parsed history output");
    Ok(parser.finish())
}

fn is_header(line: &str) -> bool {
    line.strip_prefix(HEADER_SENTINEL)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(FIELD_DELIMITER))
}

/// Parse `commit|<id>|<name>|<email>|<epoch>`
///
/// The id and epoch are anchored at the ends so an author name containing
/// the delimiter still parses.
fn parse_header(line: &str, line_no: usize) -> Result<CommitHeader, GitError> {
    let missing = || GitError::malformed(line_no, format!("incomplete commit header: {line}"));

    let rest = line[HEADER_SENTINEL.len()..]
        .strip_prefix(FIELD_DELIMITER)
        .ok_or_else(missing)?;

    let mut tail = rest.rsplitn(3, FIELD_DELIMITER);
    let epoch = tail.next().ok_or_else(missing)?;
    let author_email = tail.next().ok_or_else(missing)?;
    let head = tail.next().ok_or_else(missing)?;
    let (id, author_name) = head.split_once(FIELD_DELIMITER).ok_or_else(missing)?;

    if id.is_empty() {
        return Err(missing());
    }

    let timestamp_epoch = epoch.trim().parse::<i64>().map_err(|_| {
        GitError::malformed(line_no, format!("commit timestamp is not an integer: {epoch}"))
    })?;

    Ok(CommitHeader {
        id: id.to_string(),
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        timestamp_epoch,
    })
}

/// Parse `<added>\t<removed>\t<path>`, keeping the counts as raw tokens
fn parse_change(line: &str, line_no: usize) -> Result<FileChangeRecord, GitError> {
    let mut fields = line.splitn(3, '\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(added), Some(removed), Some(path)) if !path.is_empty() => Ok(FileChangeRecord {
            lines_added: added.to_string(),
            lines_removed: removed.to_string(),
            relative_path: unquote_path(path),
        }),
        _ => Err(GitError::malformed(
            line_no,
            format!("expected added<TAB>removed<TAB>path, got: {line}"),
        )),
    }
}

/// Decode a path git printed as a C-style quoted string
///
/// Git quotes paths containing `"`, `\` or control characters even with
/// `core.quotePath=false`. Unquoted paths are returned unchanged.
fn unquote_path(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'v') => bytes.push(0x0b),
            Some(digit @ b'0'..=b'7') => {
                // Up to three octal digits form one raw byte
                let mut value = u16::from(digit - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + u16::from(next - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
