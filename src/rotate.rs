//! Log rotation: move past-dated sections of `System_Log.md` into archives.
//!
//! A run reads the log once and then works in two phases:
//!
//! 1. Snapshot the log into `Logs/backups/`, then write and verify one
//!    archive per date other than today.
//! 2. Rewrite the log with today's section, plus any section whose archive
//!    could not be confirmed, so nothing is dropped without a durable copy.
//!
//! An unreadable log aborts the run before anything is written.

mod archive;
mod backup;
mod parse;
mod rewrite;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jiff::civil::{Date, DateTime};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::layout::Layout;

use parse::LogDocument;
use rewrite::Retain;

/// Errors that abort a rotation run.
#[derive(Debug, thiserror::Error)]
pub enum RotateError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to rewrite {path}: {source}")]
    Rewrite { path: PathBuf, source: io::Error },
}

/// The result of a completed rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub today: Date,
    pub sections_found: usize,
    pub archived: Vec<Date>,

    /// Dates left in the live log because their archive failed.
    pub retained: Vec<Date>,
    pub today_entries: bool,
    pub backup: Option<PathBuf>,
    pub dropped_lines: usize,
}

impl RotationReport {
    /// True when every non-today section reached its archive.
    pub fn is_complete(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Rotates one system log under a layout.
#[derive(Debug, Clone)]
pub struct Rotator {
    layout: Layout,
}

impl Rotator {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Rotate as of `now`, local wall-clock time.
    pub fn rotate(&self, now: DateTime) -> Result<RotationReport, RotateError> {
        let log_path = self.layout.system_log();
        let today = now.date();

        let text = fs::read_to_string(&log_path).map_err(|source| {
            error!("Error reading {}: {source}", log_path.display());
            RotateError::Read {
                path: log_path.clone(),
                source,
            }
        })?;

        let backup = self.take_backup(&text, now);

        let doc = LogDocument::parse(&text);
        info!("Found {} date section(s)", doc.sections.len());
        if doc.dropped_lines > 0 {
            warn!(
                "{} line(s) outside any dated section were dropped",
                doc.dropped_lines
            );
        }

        // Phase one: every non-today section gets a verified archive.
        let archive_ready = match self.layout.ensure_archive_dir() {
            Ok(()) => true,
            Err(e) => {
                error!("Cannot prepare archive folder: {e}; past dates stay in the live log");
                false
            }
        };
        let mut archived = Vec::new();
        let mut retained = Vec::new();
        let archive_dir = self.layout.archive_dir();
        for (&date, lines) in doc.sections.iter().filter(|(d, _)| **d != today) {
            if !archive_ready {
                retained.push(date);
                continue;
            }
            let content = archive::render(date, lines, today);
            match archive::write(&archive_dir, date, &content) {
                Ok(path) => {
                    info!("Archived {date} → {}", path.display());
                    archived.push(date);
                }
                Err(e) => {
                    error!("Error archiving {date}: {e}; keeping it in the live log");
                    retained.push(date);
                }
            }
        }

        // Phase two: replace the live log.
        let retain = Retain {
            today,
            unarchived: &retained,
            archived_count: archived.len(),
        };
        let rewritten = rewrite::render(&doc, retain, now);
        write_atomic(&log_path, &rewritten).map_err(|source| {
            error!("Error writing updated {}: {source}", log_path.display());
            RotateError::Rewrite {
                path: log_path.clone(),
                source,
            }
        })?;
        info!("Updated {} with rotation status", log_path.display());

        Ok(RotationReport {
            today,
            sections_found: doc.sections.len(),
            today_entries: doc.section(today).is_some(),
            archived,
            retained,
            backup,
            dropped_lines: doc.dropped_lines,
        })
    }

    /// Snapshot the text just read. Failure only costs the backup.
    fn take_backup(&self, text: &str, now: DateTime) -> Option<PathBuf> {
        let result = self
            .layout
            .ensure_backup_dir()
            .map_err(|e| e.to_string())
            .and_then(|()| {
                backup::snapshot(&self.layout.backup_dir(), text.as_bytes(), now)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(path) => {
                info!("Backup created: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not create backup: {e}");
                None
            }
        }
    }
}

/// Replace `path` with `content` via a synced temp file in the same directory.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
