//! Task record: metadata and markdown rendering.

use std::fmt;

use jiff::civil::DateTime;

/// Timestamp format used in task metadata and body.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Best-effort size of the source file at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Known(u64),

    /// The source was gone by the time the task was written.
    Vanished,

    /// The source exists but its metadata could not be read.
    Unknown,
}

impl FileSize {
    /// Base-1024 size with one decimal, e.g. `1.5 KB`.
    pub fn human(self) -> String {
        match self {
            Self::Known(bytes) => human_size(bytes),
            Self::Vanished => "Unknown (file not found)".to_string(),
            Self::Unknown => "Unknown".to_string(),
        }
    }
}

impl fmt::Display for FileSize {
    /// Metadata form: the byte count, or `unknown`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(bytes) => write!(f, "{bytes}"),
            Self::Vanished | Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[allow(clippy::cast_precision_loss)] // Display only.
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}

/// A pending review task for one inbox file.
///
/// Status, priority and tags are fixed at creation; downstream consumers
/// edit the written file, never this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub filename: String,
    pub size: FileSize,
    pub detected_at: DateTime,
}

impl TaskRecord {
    pub const STATUS: &'static str = "pending";
    pub const PRIORITY: &'static str = "normal";

    pub fn new(filename: &str, size: FileSize, detected_at: DateTime) -> Self {
        Self {
            filename: filename.to_string(),
            size,
            detected_at,
        }
    }

    /// Render the task file: metadata block, then the review checklist.
    ///
    /// The filename is JSON-quoted so names with `:` or quotes keep the
    /// metadata block well-formed.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        let quoted = serde_json::to_string(&self.filename)?;
        let detected = self.detected_at.strftime(TIMESTAMP_FORMAT);
        let size = self.size;
        let human = size.human();
        let name = &self.filename;
        let (status, priority) = (Self::STATUS, Self::PRIORITY);

        Ok(format!(
            "---
type: file_review
status: {status}
priority: {priority}
source: Inbox
filename: {quoted}
file_size: {size}
created_at: {detected}
tags: []
---

# Task: Review File - {name}

## File Information
- **Source**: Inbox
- **Size**: {human}
- **Detected**: {detected}

## Required Actions
- [ ] Review the file content
- [ ] Decide what action is needed
- [ ] Tag appropriately (urgent/invoice/client/personal)
- [ ] Move to Done when complete

## Notes
(Add your observations here)
"
        ))
    }
}
