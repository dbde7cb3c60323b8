//! The per-file output of a scan.

use docsift_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One accepted file: where it is, when it last changed and its text.
///
/// Built once by the scanner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    path: PathBuf,
    last_modified: Timestamp,
    content: String,
}

impl FileRecord {
    /// Create a record.
    #[must_use]
    pub fn new(path: PathBuf, last_modified: Timestamp, content: String) -> Self {
        Self {
            path,
            last_modified,
            content,
        }
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time from filesystem metadata.
    #[must_use]
    pub fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// Extracted text; empty when the file yielded none.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Split the record into its fields.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, Timestamp, String) {
        (self.path, self.last_modified, self.content)
    }
}
