//! Task emission: one review task per newly detected inbox file.
//!
//! A task is a markdown file in `Needs_Action/` with a fixed-key metadata
//! block followed by a human-facing checklist. At most one task exists per
//! source filename: an existing destination is never overwritten.

mod record;

pub use record::FileSize;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jiff::civil::DateTime;
use tempfile::NamedTempFile;
use tracing::warn;

use record::TaskRecord;

/// Errors that can occur while writing a task file.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to write task {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode task metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What happened when a task was requested for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// A new task file was written.
    Created { path: PathBuf, size: FileSize },

    /// A task for this filename already exists; nothing was written.
    Skipped(PathBuf),
}

/// Task filename for a source file: spaces and dots become underscores.
///
/// `My Invoice.pdf` → `task_My_Invoice_pdf.md`
pub fn task_filename(source: &str) -> String {
    let sanitized: String = source
        .chars()
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .collect();
    format!("task_{sanitized}.md")
}

/// Writes task files for inbox entries.
#[derive(Debug, Clone)]
pub struct TaskEmitter {
    inbox: PathBuf,
    tasks: PathBuf,
}

impl TaskEmitter {
    pub fn new(inbox: impl Into<PathBuf>, tasks: impl Into<PathBuf>) -> Self {
        Self {
            inbox: inbox.into(),
            tasks: tasks.into(),
        }
    }

    /// The directory task files are written to.
    pub fn task_dir(&self) -> &Path {
        &self.tasks
    }

    /// Emit a task for `filename`, detected at `detected_at`.
    ///
    /// Returns [`Emission::Skipped`] if a task already exists for the file.
    /// A source that vanished since detection still gets a task, with an
    /// unknown size.
    pub fn emit(&self, filename: &str, detected_at: DateTime) -> Result<Emission, EmitError> {
        let dest = self.tasks.join(task_filename(filename));
        if dest.exists() {
            warn!("Task already exists: {}", dest.display());
            return Ok(Emission::Skipped(dest));
        }

        let record = TaskRecord::new(filename, self.source_size(filename), detected_at);
        let content = record.render()?;

        let write_err = |source| EmitError::Write {
            path: dest.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.tasks).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;

        // No-clobber closes the window between the existence check and the write.
        match tmp.persist_noclobber(&dest) {
            Ok(_) => Ok(Emission::Created {
                path: dest,
                size: record.size,
            }),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                warn!("Task appeared while writing: {}", dest.display());
                Ok(Emission::Skipped(dest))
            }
            Err(e) => Err(write_err(e.error)),
        }
    }

    fn source_size(&self, filename: &str) -> FileSize {
        match fs::metadata(self.inbox.join(filename)) {
            Ok(meta) => FileSize::Known(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("File disappeared before task creation: {filename}");
                FileSize::Vanished
            }
            Err(e) => {
                warn!("Could not get file size for {filename}: {e}");
                FileSize::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TaskEmitter) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Inbox")).unwrap();
        fs::create_dir(dir.path().join("Needs_Action")).unwrap();
        let emitter = TaskEmitter::new(dir.path().join("Inbox"), dir.path().join("Needs_Action"));
        (dir, emitter)
    }

    fn detected() -> DateTime {
        date(2026, 2, 12).at(9, 30, 0, 0)
    }

    fn task_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn sanitizes_spaces_and_dots() {
        assert_eq!(task_filename("My Invoice.pdf"), "task_My_Invoice_pdf.md");
        assert_eq!(task_filename("a.b.c"), "task_a_b_c.md");
        assert_eq!(task_filename("plain"), "task_plain.md");
    }

    #[test]
    fn sanitization_is_deterministic() {
        let first = task_filename("My Invoice.pdf");
        let second = task_filename("My Invoice.pdf");
        assert_eq!(first, second);
    }

    #[test]
    fn creates_task_with_metadata() {
        let (dir, emitter) = setup();
        fs::write(dir.path().join("Inbox").join("My Invoice.pdf"), "0123456789").unwrap();

        let outcome = emitter.emit("My Invoice.pdf", detected()).unwrap();
        let expected = dir.path().join("Needs_Action").join("task_My_Invoice_pdf.md");
        assert_eq!(
            outcome,
            Emission::Created {
                path: expected.clone(),
                size: FileSize::Known(10)
            }
        );

        let content = fs::read_to_string(expected).unwrap();
        assert!(content.starts_with("---\ntype: file_review\nstatus: pending\npriority: normal\n"));
        assert!(content.contains("filename: \"My Invoice.pdf\"\n"));
        assert!(content.contains("file_size: 10\n"));
        assert!(content.contains("created_at: 2026-02-12 09:30:00\n"));
        assert!(content.contains("tags: []\n"));
        assert!(content.contains("- **Size**: 10.0 B\n"));
    }

    #[test]
    fn second_emit_is_skipped() {
        let (dir, emitter) = setup();
        fs::write(dir.path().join("Inbox").join("a.txt"), "a").unwrap();

        let first = emitter.emit("a.txt", detected()).unwrap();
        let second = emitter.emit("a.txt", detected()).unwrap();

        assert!(matches!(first, Emission::Created { .. }));
        assert!(matches!(second, Emission::Skipped(_)));
        assert_eq!(task_files(&dir.path().join("Needs_Action")), ["task_a_txt.md"]);
    }

    #[test]
    fn existing_task_is_not_overwritten() {
        let (dir, emitter) = setup();
        let dest = dir.path().join("Needs_Action").join("task_a_txt.md");
        fs::write(&dest, "edited by a human").unwrap();

        let outcome = emitter.emit("a.txt", detected()).unwrap();

        assert_eq!(outcome, Emission::Skipped(dest.clone()));
        assert_eq!(fs::read_to_string(dest).unwrap(), "edited by a human");
    }

    #[test]
    fn vanished_source_gets_unknown_size() {
        let (dir, emitter) = setup();

        let outcome = emitter.emit("gone.txt", detected()).unwrap();
        let Emission::Created { path, size } = outcome else {
            panic!("expected a created task");
        };

        assert_eq!(size, FileSize::Vanished);
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("file_size: unknown\n"));
        assert!(content.contains("- **Size**: Unknown (file not found)\n"));
        assert_eq!(task_files(&dir.path().join("Needs_Action")).len(), 1);
    }

    #[test]
    fn missing_task_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let emitter = TaskEmitter::new(dir.path().join("Inbox"), dir.path().join("missing"));

        let err = emitter.emit("a.txt", detected()).unwrap_err();
        assert!(matches!(err, EmitError::Write { .. }));
    }
}
