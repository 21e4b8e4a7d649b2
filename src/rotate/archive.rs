//! Per-date archive files under `Logs/`.

use std::path::{Path, PathBuf};
use std::{fs, io};

use jiff::civil::Date;

use super::parse::entry_lines;
use super::write_atomic;

/// Archive path for a date: `<dir>/<YYYY-MM-DD>.md`.
pub fn archive_path(dir: &Path, date: Date) -> PathBuf {
    dir.join(format!("{date}.md"))
}

/// Render an archive: preamble, then the section's entries.
///
/// Depends only on the section and the rotation day, so re-archiving the
/// same backlog on the same day produces identical bytes.
pub fn render(date: Date, lines: &[String], today: Date) -> String {
    let mut out = format!(
        "# System Log Archive - {date}\n\n\
         > **Archived from:** System_Log.md\n\
         > **Archive date:** {today}\n\n\
         ---\n\n"
    );
    out.extend(entry_lines(lines));
    out
}

/// Write an archive durably and confirm the bytes on disk match.
pub fn write(dir: &Path, date: Date, content: &str) -> io::Result<PathBuf> {
    let path = archive_path(dir, date);
    write_atomic(&path, content)?;

    if fs::read(&path)? != content.as_bytes() {
        return Err(io::Error::other(format!(
            "{} does not match what was written",
            path.display()
        )));
    }
    Ok(path)
}
