//! Pre-rotation snapshots of the system log.
//!
//! Snapshots are never pruned.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jiff::civil::DateTime;

/// Write `content` to a new, uniquely named snapshot in `dir`.
///
/// The name is `System_Log_backup_<YYYYMMDD_HHMMSS>.md`; when two runs land
/// in the same second, `_1`, `_2`, … are appended rather than overwriting.
pub fn snapshot(dir: &Path, content: &[u8], now: DateTime) -> io::Result<PathBuf> {
    let stamp = now.strftime("%Y%m%d_%H%M%S").to_string();

    for attempt in 0u32.. {
        let name = if attempt == 0 {
            format!("System_Log_backup_{stamp}.md")
        } else {
            format!("System_Log_backup_{stamp}_{attempt}.md")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(content)?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::other("no free backup name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use jiff::civil::date;
    use tempfile::TempDir;

    fn now() -> DateTime {
        date(2026, 2, 12).at(7, 8, 9, 0)
    }

    #[test]
    fn snapshot_copies_bytes_verbatim() {
        let dir = TempDir::new().unwrap();

        let path = snapshot(dir.path(), b"# System Log\n", now()).unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "System_Log_backup_20260212_070809.md"
        );
        assert_eq!(fs::read(path).unwrap(), b"# System Log\n");
    }

    #[test]
    fn same_second_gets_a_distinct_name() {
        let dir = TempDir::new().unwrap();

        let first = snapshot(dir.path(), b"one", now()).unwrap();
        let second = snapshot(dir.path(), b"two", now()).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap(),
            "System_Log_backup_20260212_070809_1.md"
        );
        assert_eq!(fs::read(first).unwrap(), b"one");
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(snapshot(&dir.path().join("nope"), b"x", now()).is_err());
    }
}
