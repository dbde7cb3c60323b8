//! Configuration management for docsift.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The loaded value is immutable from the
//! scanner's point of view: it is handed to the scanner once and never
//! consulted through global state.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main docsift configuration.
///
/// This is loaded from `~/.config/docsift/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsiftConfig {
    /// Traversal and filtering settings
    pub scan: ScanConfig,
    /// Spreadsheet decoder settings
    pub spreadsheet: SpreadsheetConfig,
}

impl DocsiftConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// Unlike [`DocsiftConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `DOCSIFT_EXCLUDE_PATHS`: comma-separated exclusion substrings
    /// - `DOCSIFT_EXTENSIONS`: comma-separated supported extensions
    /// - `DOCSIFT_MAX_FILE_SIZE`: maximum file size in bytes
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Split out of [`DocsiftConfig::load_with_env`] so the parsing can be
    /// exercised without touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DOCSIFT_EXCLUDE_PATHS") {
            self.scan.exclude_paths = split_list(&val);
            tracing::debug!(
                "Override scan.exclude_paths from env: {:?}",
                self.scan.exclude_paths
            );
        }

        if let Some(val) = lookup("DOCSIFT_EXTENSIONS") {
            self.scan.supported_extensions = split_list(&val)
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect();
            tracing::debug!(
                "Override scan.supported_extensions from env: {:?}",
                self.scan.supported_extensions
            );
        }

        if let Some(val) = lookup("DOCSIFT_MAX_FILE_SIZE") {
            if let Ok(bytes) = val.trim().parse() {
                self.scan.max_file_size = Some(bytes);
                tracing::debug!("Override scan.max_file_size from env: {}", bytes);
            }
        }
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        self.scan.validate()?;
        self.spreadsheet.validate()
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| ConfigError::invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/docsift/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "docsift", "docsift").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Traversal and filtering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Substrings that prune any directory whose path contains them
    pub exclude_paths: Vec<String>,
    /// Extensions eligible for extraction, without the leading dot
    pub supported_extensions: Vec<String>,
    /// Files larger than this many bytes are skipped (none = unlimited)
    pub max_file_size: Option<u64>,
    /// Directories deeper than this below the root are not descended (none = unlimited)
    pub max_depth: Option<usize>,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
}

impl ScanConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(ext) = self
            .supported_extensions
            .iter()
            .find(|ext| normalize_extension(ext).is_empty())
        {
            return Err(ConfigError::invalid(
                "scan.supported_extensions",
                format!("empty extension token {ext:?}"),
            ));
        }

        if self.exclude_paths.iter().any(String::is_empty) {
            // An empty substring is contained in every path and would prune the root.
            return Err(ConfigError::invalid(
                "scan.exclude_paths",
                "empty exclusion substring",
            ));
        }

        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_paths: vec![
                "$RECYCLE.BIN".to_string(),
                "System Volume Information".to_string(),
            ],
            supported_extensions: ["doc", "docx", "xls", "xlsx", "pdf", "txt"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_file_size: None,
            max_depth: None,
            follow_symlinks: false,
        }
    }
}

/// Spreadsheet decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetConfig {
    /// Raw read chunk size in bytes for the streaming reader
    pub buffer_size: usize,
    /// Decimal separator used when formatting legacy numeric cells
    pub decimal_separator: char,
}

impl SpreadsheetConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.buffer_size == 0 {
            return Err(ConfigError::invalid(
                "spreadsheet.buffer_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            decimal_separator: '.',
        }
    }
}

/// Normalize an extension token: trim, drop one leading dot, lowercase.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    trimmed
        .strip_prefix('.')
        .unwrap_or(trimmed)
        .to_lowercase()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
