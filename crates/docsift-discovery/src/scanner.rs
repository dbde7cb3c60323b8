//! Depth-first directory traversal producing one [`FileRecord`] per accepted file.
//!
//! The walk uses an explicit stack of pending paths, so tree depth never
//! turns into call-stack depth. Failures below the root are isolated to the
//! path that caused them: an unreadable directory contributes nothing, and a
//! file that cannot be extracted is dropped while its siblings are still
//! visited. Only regular files are opened; FIFOs, sockets and device nodes
//! are skipped before any read.

use crate::classifier::{extension_of, PathClassifier};
use crate::error::{Result, ScanError};
use crate::record::FileRecord;
use docsift_core::{ConfigError, DocsiftConfig, ScanConfig, Timestamp};
use docsift_extract::ExtractorRegistry;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, debug_span, error, info, warn};

/// Walks a tree and extracts the text of every supported file in it.
pub struct Scanner {
    config: ScanConfig,
    classifier: PathClassifier,
    registry: ExtractorRegistry,
}

/// A path waiting to be visited, with its depth below the root.
struct Pending {
    path: PathBuf,
    depth: usize,
    ancestors: Option<Rc<Ancestor>>,
}

/// A directory on the way down from the root, by canonical location.
struct Ancestor {
    dir: PathBuf,
    parent: Option<Rc<Ancestor>>,
}

impl Ancestor {
    fn chain_contains(mut node: Option<&Ancestor>, dir: &Path) -> bool {
        while let Some(ancestor) = node {
            if ancestor.dir == dir {
                return true;
            }
            node = ancestor.parent.as_deref();
        }
        false
    }
}

/// Counters reported once a scan finishes.
#[derive(Debug, Default)]
struct ScanStats {
    directories: usize,
    pruned: usize,
    unsupported: usize,
    skipped_symlinks: usize,
    special: usize,
    inaccessible: usize,
    oversized: usize,
    dropped: usize,
}

impl Scanner {
    /// Create a scanner with the built-in decoders.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid.
    pub fn new(config: &DocsiftConfig) -> Result<Self> {
        config.validate()?;
        let registry = ExtractorRegistry::with_defaults(&config.spreadsheet);
        Self::with_registry(config.scan.clone(), registry)
    }

    /// Create a scanner around a custom registry.
    ///
    /// # Errors
    /// Returns error if a supported extension has no decoder family.
    pub fn with_registry(config: ScanConfig, registry: ExtractorRegistry) -> Result<Self> {
        if let Some(extension) = config
            .supported_extensions
            .iter()
            .find(|ext| !registry.handles_extension(ext))
        {
            return Err(ScanError::Config(ConfigError::invalid(
                "scan.supported_extensions",
                format!("no decoder for extension {extension:?}"),
            )));
        }

        Ok(Self {
            classifier: PathClassifier::new(&config),
            config,
            registry,
        })
    }

    /// Scan `root`, which may be a directory or a single file.
    ///
    /// Records come back in depth-first order, children of a directory
    /// visited by file name.
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidRoot`] if `root` is empty, cannot be made
    /// absolute or does not exist. Nothing below the root fails the scan.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<Vec<FileRecord>> {
        let root = absolute_root(root.as_ref())?;
        info!(root = %root.display(), "starting scan");

        let mut records = Vec::new();
        let mut stats = ScanStats::default();
        let mut pending = vec![Pending {
            path: root.clone(),
            depth: 0,
            ancestors: None,
        }];

        while let Some(next) = pending.pop() {
            self.visit(next, &mut pending, &mut records, &mut stats);
        }

        info!(
            root = %root.display(),
            records = records.len(),
            directories = stats.directories,
            pruned = stats.pruned,
            unsupported = stats.unsupported,
            skipped_symlinks = stats.skipped_symlinks,
            special = stats.special,
            inaccessible = stats.inaccessible,
            oversized = stats.oversized,
            dropped = stats.dropped,
            "scan finished"
        );

        Ok(records)
    }

    fn visit(
        &self,
        Pending {
            path,
            depth,
            ancestors,
        }: Pending,
        pending: &mut Vec<Pending>,
        records: &mut Vec<FileRecord>,
        stats: &mut ScanStats,
    ) {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot access path");
                stats.inaccessible += 1;
                return;
            }
        };

        let is_symlink = metadata.file_type().is_symlink();
        let target = if is_symlink {
            match fs::metadata(&path) {
                Ok(target) => target,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "broken symlink");
                    stats.inaccessible += 1;
                    return;
                }
            }
        } else {
            metadata
        };

        if target.is_dir() {
            // The root is always followed; it was named explicitly.
            if is_symlink && depth > 0 && !self.config.follow_symlinks {
                debug!(path = %path.display(), "skipping symlinked directory");
                stats.skipped_symlinks += 1;
                return;
            }
            self.visit_directory(&path, depth, ancestors, pending, stats);
        } else if target.is_file() {
            self.visit_file(&path, records, stats);
        } else {
            debug!(path = %path.display(), "skipping special file");
            stats.special += 1;
        }
    }

    fn visit_directory(
        &self,
        path: &Path,
        depth: usize,
        ancestors: Option<Rc<Ancestor>>,
        pending: &mut Vec<Pending>,
        stats: &mut ScanStats,
    ) {
        if self.classifier.is_excluded(path) {
            debug!(path = %path.display(), "pruning excluded directory");
            stats.pruned += 1;
            return;
        }
        if self.config.max_depth.is_some_and(|max| depth > max) {
            debug!(path = %path.display(), depth, "pruning directory below depth limit");
            stats.pruned += 1;
            return;
        }

        let canonical = match fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot resolve directory");
                stats.inaccessible += 1;
                return;
            }
        };
        if Ancestor::chain_contains(ancestors.as_deref(), &canonical) {
            warn!(
                path = %path.display(),
                target = %canonical.display(),
                "symlink loop, not descending"
            );
            stats.skipped_symlinks += 1;
            return;
        }

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot list directory");
                stats.inaccessible += 1;
                return;
            }
        };
        stats.directories += 1;

        let mut children = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => children.push(entry.path()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read directory entry");
                    stats.inaccessible += 1;
                }
            }
        }
        children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let node = Rc::new(Ancestor {
            dir: canonical,
            parent: ancestors,
        });
        // Reversed so the stack pops children in name order.
        pending.extend(children.into_iter().rev().map(|child| Pending {
            path: child,
            depth: depth + 1,
            ancestors: Some(Rc::clone(&node)),
        }));
    }

    fn visit_file(&self, path: &Path, records: &mut Vec<FileRecord>, stats: &mut ScanStats) {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.classifier.is_supported_extension(&file_name) {
            debug!(path = %path.display(), "skipping unsupported file");
            stats.unsupported += 1;
            return;
        }

        match self.read_record(path, extension_of(&file_name)) {
            Ok(record) => records.push(record),
            Err(e @ ScanError::FileTooLarge { .. }) => {
                warn!(error = %e, "skipping oversized file");
                stats.oversized += 1;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "dropping file");
                stats.dropped += 1;
            }
        }
    }

    /// Open, extract and close one file.
    ///
    /// The file handle is owned by this frame and released on every return.
    fn read_record(&self, path: &Path, extension: &str) -> Result<FileRecord> {
        let span = debug_span!("file", path = %path.display());
        let _enter = span.enter();

        let access = |source| ScanError::PathAccess {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(access)?;
        let metadata = file.metadata().map_err(access)?;

        if let Some(limit) = self.config.max_file_size {
            if metadata.len() > limit {
                return Err(ScanError::FileTooLarge {
                    path: path.to_path_buf(),
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let last_modified = Timestamp::from(metadata.modified().map_err(access)?);
        let mut source = BufReader::new(file);
        let content = self
            .registry
            .extract(extension, &mut source)
            .map_err(|source| ScanError::Extraction {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(chars = content.len(), modified = %last_modified, "extracted");
        Ok(FileRecord::new(path.to_path_buf(), last_modified, content))
    }
}

/// Resolve the root argument to an existing absolute path.
///
/// `.` components and repeated separators are removed; symlinks and `..`
/// are kept as given.
fn absolute_root(root: &Path) -> Result<PathBuf> {
    let invalid = |reason: String| ScanError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    if root.as_os_str().is_empty() {
        return Err(invalid("empty path".to_string()));
    }

    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| invalid(format!("cannot resolve working directory: {e}")))?
            .join(root)
    };
    let absolute: PathBuf = absolute.components().collect();

    match absolute.try_exists() {
        Ok(true) => Ok(absolute),
        Ok(false) => Err(invalid("does not exist".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}
