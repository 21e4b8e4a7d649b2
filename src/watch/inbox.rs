//! Inbox listing: the visible regular files currently in the inbox.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{fs, io};

use tracing::{debug, warn};

/// A file present in the inbox at listing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFile {
    pub name: String,
    pub size_bytes: Option<u64>,
}

/// Read-only view of the inbox directory.
#[derive(Debug, Clone)]
pub struct Inbox {
    path: PathBuf,

    /// Names already reported as unusable, so each is warned about once.
    unusable: HashSet<OsString>,
}

impl Inbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            unusable: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List regular, non-hidden files, sorted by name.
    ///
    /// Entries whose metadata can't be read are skipped with a warning.
    /// Names that aren't valid UTF-8 are skipped too: they can't be turned
    /// into a task filename faithfully. Each such name is warned about on
    /// the first listing that sees it only.
    pub fn list(&mut self) -> io::Result<Vec<WatchedFile>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Could not read inbox entry: {e}");
                    continue;
                }
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    self.skip_unusable(raw);
                    continue;
                }
            };
            if is_hidden(&name) {
                continue;
            }

            // Follows symlinks, so a link to a regular file counts as a file.
            let metadata = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(e) => {
                    warn!("Could not check item '{name}': {e}");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(WatchedFile {
                name,
                size_bytes: Some(metadata.len()),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn skip_unusable(&mut self, raw: OsString) {
        if self.unusable.contains(&raw) {
            debug!("Skipping non UTF-8 inbox entry: {raw:?}");
        } else {
            warn!("Skipping non UTF-8 inbox entry: {raw:?}");
            self.unusable.insert(raw);
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
