//! Filesystem layout under the steward root.
//!
//! ```text
//! <root>/
//!   steward.toml            # Optional settings
//!   Inbox/                  # Externally populated, read-only to the watcher
//!   Needs_Action/           # One task file per newly detected inbox file
//!   watcher_errors.log      # Watcher diagnostics, appended
//!   System_Log.md           # The rotated document
//!   Logs/<date>.md          # One archive per rotated date
//!   Logs/backups/           # Pre-rotation snapshots
//! ```

use std::path::{Path, PathBuf};
use std::{fs, io};

use tracing::info;

/// Errors that can occur while preparing directories.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },
}

/// Paths derived from a single root directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("steward.toml")
    }

    pub fn inbox(&self) -> PathBuf {
        self.root.join("Inbox")
    }

    pub fn needs_action(&self) -> PathBuf {
        self.root.join("Needs_Action")
    }

    pub fn watcher_log(&self) -> PathBuf {
        self.root.join("watcher_errors.log")
    }

    pub fn system_log(&self) -> PathBuf {
        self.root.join("System_Log.md")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("Logs")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.archive_dir().join("backups")
    }

    /// Create `Inbox/` and `Needs_Action/` if they are missing.
    pub fn ensure_watch_dirs(&self) -> Result<(), LayoutError> {
        ensure_dir(&self.inbox())?;
        ensure_dir(&self.needs_action())
    }

    /// Create `Logs/` if it is missing.
    pub fn ensure_archive_dir(&self) -> Result<(), LayoutError> {
        ensure_dir(&self.archive_dir())
    }

    /// Create `Logs/backups/` (and `Logs/`) if missing.
    pub fn ensure_backup_dir(&self) -> Result<(), LayoutError> {
        ensure_dir(&self.backup_dir())
    }
}

/// Create a directory (and parents) unless it already exists as a directory.
fn ensure_dir(path: &Path) -> Result<(), LayoutError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(LayoutError::NotADirectory(path.to_path_buf()));
    }
    fs::create_dir_all(path).map_err(|source| LayoutError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created missing folder: {}", path.display());
    Ok(())
}
