//! Path exclusion and extension filtering.
//!
//! Both checks are pure string tests and never touch the filesystem.

use docsift_core::{normalize_extension, ScanConfig};
use std::collections::HashSet;
use std::path::Path;

/// Decides which directories are pruned and which files are read.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    /// Exclusion substrings, in configured order
    exclusions: Vec<String>,
    /// Normalized supported extensions
    extensions: HashSet<String>,
}

impl PathClassifier {
    /// Build a classifier from the scan settings.
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            exclusions: config.exclude_paths.clone(),
            extensions: config
                .supported_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Whether the path contains any exclusion substring.
    ///
    /// The scanner only asks this of directories.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.exclusions
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
    }

    /// Whether the file name carries a supported extension.
    #[must_use]
    pub fn is_supported_extension(&self, file_name: &str) -> bool {
        let extension = extension_of(file_name);
        !extension.is_empty() && self.extensions.contains(&extension.to_lowercase())
    }
}

/// The text after the last '.' of a file name, or "" when there is none.
#[must_use]
pub fn extension_of(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or("", |(_, extension)| extension)
}
