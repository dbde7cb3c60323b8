//! Error types for directory scanning.

use docsift_core::ConfigError;
use docsift_extract::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning a tree.
///
/// Only [`ScanError::InvalidRoot`] and [`ScanError::Config`] ever reach the
/// caller of a scan. The per-path variants are logged and the offending
/// path is skipped.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root argument cannot be scanned at all
    #[error("invalid scan root {}: {reason}", path.display())]
    InvalidRoot {
        /// Root as given by the caller
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// A path below the root could not be read
    #[error("cannot access {}: {source}", path.display())]
    PathAccess {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A file's content could not be extracted
    #[error("failed to extract {}: {source}", path.display())]
    Extraction {
        /// Offending file
        path: PathBuf,
        /// Decoder failure
        #[source]
        source: ExtractError,
    },

    /// A file exceeds the configured size limit
    #[error("{} is {size} bytes, over the {limit} byte limit", path.display())]
    FileTooLarge {
        /// Offending file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// The scan configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
