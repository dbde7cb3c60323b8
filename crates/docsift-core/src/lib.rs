//! Docsift Core - Foundation crate for the docsift document harvester.
//!
//! This crate provides the configuration error type, configuration management and
//! timestamp handling that the extraction and discovery crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error type using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use docsift_core::DocsiftConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocsiftConfig::default();
//! config.validate()?;
//! assert!(config.scan.supported_extensions.iter().any(|ext| ext == "pdf"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{normalize_extension, DocsiftConfig, ScanConfig, SpreadsheetConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::Timestamp;
