//! Docsift Discovery - Recursive document harvesting.
//!
//! Walks a directory tree, prunes excluded subtrees, filters files by
//! extension and turns every accepted file into a [`FileRecord`] holding its
//! absolute path, modification time and extracted text.
//!
//! # Architecture
//!
//! - **Classifier** ([`classifier`]): exclusion substrings and extension whitelist
//! - **Scanner** ([`scanner`]): work-list traversal with per-file isolation
//! - **Records** ([`record`]): the per-file output
//! - **Errors** ([`error`]): scan error types
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift_core::DocsiftConfig;
//! use docsift_discovery::Scanner;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = Scanner::new(&DocsiftConfig::load_with_env()?)?;
//! for record in scanner.scan("/srv/shared/documents")? {
//!     println!("{} ({} chars)", record.path().display(), record.content().len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod error;
pub mod record;
pub mod scanner;

use docsift_core::DocsiftConfig;
use std::path::Path;

// Re-export main types
pub use classifier::{extension_of, PathClassifier};
pub use error::{Result, ScanError};
pub use record::FileRecord;
pub use scanner::Scanner;

/// Scan `root` with the built-in decoders.
///
/// Shorthand for [`Scanner::new`] followed by [`Scanner::scan`].
pub fn scan(root: impl AsRef<Path>, config: &DocsiftConfig) -> Result<Vec<FileRecord>> {
    Scanner::new(config)?.scan(root)
}
