//! Leading comments keyed by symbol.

use std::collections::HashMap;

use crate::descriptor::{FileDescriptorProto, Location};
use crate::error::MalformedPathError;
use crate::path::{self, Resolved};

#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    comments: HashMap<String, String>,
    skipped: Vec<MalformedPathError>,
}

impl CommentIndex {
    /// Index the leading comments of one file.
    ///
    /// A location whose path does not decode is skipped (and logged); it never
    /// stops the rest of the file from being indexed. Comments on statements
    /// without a symbol (`reserved`, `option ...;`) are dropped so they never
    /// replace the owner's own comment.
    pub fn build(file: &FileDescriptorProto, locations: &[Location]) -> Self {
        let mut index = Self::default();
        index.extend(file, locations);
        index
    }

    /// Add the leading comments of another file. Later locations win for the
    /// same symbol.
    pub fn extend(&mut self, file: &FileDescriptorProto, locations: &[Location]) {
        for location in locations {
            let Some(text) = location.leading_comments.as_deref().and_then(normalize_comment)
            else {
                continue;
            };
            match path::resolve(file, &location.path) {
                Ok(Resolved::Symbol(symbol)) => {
                    self.comments.insert(symbol, text);
                }
                Ok(Resolved::Statement { owner, tag }) => {
                    tracing::debug!(
                        owner = %owner,
                        tag,
                        path = ?location.path,
                        "ignoring comment on a statement without a symbol"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        file = %err.file,
                        path = ?err.path,
                        reason = %err.reason,
                        "skipping comment with malformed structural path"
                    );
                    self.skipped.push(err);
                }
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.comments.get(symbol).map(String::as_str)
    }

    /// Locations dropped because their path did not decode.
    pub fn skipped(&self) -> &[MalformedPathError] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// Trim trailing whitespace and drop the single space `protoc` keeps after
/// each `//`. Blank comments become `None`.
fn normalize_comment(raw: &str) -> Option<String> {
    let text = raw
        .trim_end()
        .replace("\r\n", "\n")
        .lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
