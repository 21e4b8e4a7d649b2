//! Parse the system log into header, dated sections, and footer.
//!
//! ```text
//! <header>                    free text; a previous rotation-status block is removed
//! ## Activity Log             marker, consumed
//! ### 2026-02-11              sub-header, opens a dated section
//! - entry
//! ### 2026-02-12
//! - entry
//! ## Notes                    footer marker, kept as the first footer line
//! <footer>
//! ```
//!
//! Lines keep their original line endings so header and footer round-trip
//! byte-for-byte.

use std::collections::BTreeMap;

use jiff::civil::Date;

pub const ACTIVITY_MARKER: &str = "## Activity Log";
pub const STATUS_MARKER: &str = "## Log Rotation Status";
pub const SUBHEADER_PREFIX: &str = "###";
pub const NO_ACTIVITY: &str = "*No activity logged today.*";

const FOOTER_MARKERS: [&str; 2] = ["## Log Entry Template", "## Notes"];
const STATUS_END: &str = "---";

/// A parsed system log.
///
/// Section lines include their `###` sub-header lines. Sections that repeat
/// a date are merged in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDocument {
    pub header: Vec<String>,
    pub sections: BTreeMap<Date, Vec<String>>,
    pub footer: Vec<String>,

    /// Non-blank lines that belonged to no dated section, plus header
    /// lines swallowed by a status block missing its closing `---`.
    pub dropped_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    /// Inside a previously injected rotation-status block.
    Status,
    /// Just past the status block's closing rule; one blank line follows.
    StatusTail,
    Activity,
    Footer,
}

/// The section currently collecting lines.
enum Bucket {
    None,
    Dated(Date, Vec<String>),
    /// A sub-header without a usable date; its lines are discarded.
    Undated,
}

impl LogDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let mut state = State::Header;
        let mut bucket = Bucket::None;
        // Non-blank lines inside a status block not yet closed by `---`.
        let mut open_status_lines = 0;

        for line in text.split_inclusive('\n') {
            let trimmed = line.trim_end();

            match state {
                State::Header => {
                    if trimmed.starts_with(ACTIVITY_MARKER) {
                        state = State::Activity;
                    } else if trimmed == STATUS_MARKER {
                        state = State::Status;
                    } else {
                        doc.header.push(line.to_string());
                    }
                }
                State::Status => {
                    if trimmed.starts_with(ACTIVITY_MARKER) {
                        // Unterminated block: whatever it swallowed is lost.
                        doc.dropped_lines += open_status_lines;
                        open_status_lines = 0;
                        state = State::Activity;
                    } else if trimmed == STATUS_END {
                        open_status_lines = 0;
                        state = State::StatusTail;
                    } else if !trimmed.is_empty() {
                        open_status_lines += 1;
                    }
                }
                State::StatusTail => {
                    if trimmed.starts_with(ACTIVITY_MARKER) {
                        state = State::Activity;
                    } else {
                        state = State::Header;
                        if !trimmed.is_empty() {
                            doc.header.push(line.to_string());
                        }
                    }
                }
                State::Activity => {
                    if is_footer_marker(trimmed) {
                        doc.flush(&mut bucket);
                        doc.footer.push(line.to_string());
                        state = State::Footer;
                    } else if trimmed.starts_with(SUBHEADER_PREFIX) {
                        doc.flush(&mut bucket);
                        bucket = match date_token(trimmed) {
                            Some(date) => Bucket::Dated(date, vec![line.to_string()]),
                            None => {
                                doc.dropped_lines += 1;
                                Bucket::Undated
                            }
                        };
                    } else {
                        match &mut bucket {
                            Bucket::Dated(_, lines) => lines.push(line.to_string()),
                            Bucket::None | Bucket::Undated => {
                                if !trimmed.is_empty() && trimmed != NO_ACTIVITY {
                                    doc.dropped_lines += 1;
                                }
                            }
                        }
                    }
                }
                State::Footer => doc.footer.push(line.to_string()),
            }
        }

        doc.flush(&mut bucket);
        if state == State::Status {
            doc.dropped_lines += open_status_lines;
        }
        doc
    }

    /// Lines of the section for `date`, if it exists.
    pub fn section(&self, date: Date) -> Option<&[String]> {
        self.sections.get(&date).map(Vec::as_slice)
    }

    fn flush(&mut self, bucket: &mut Bucket) {
        if let Bucket::Dated(date, lines) = std::mem::replace(bucket, Bucket::None) {
            self.sections.entry(date).or_default().extend(lines);
        }
    }
}

/// Section lines with every `###` sub-header removed.
pub fn entry_lines(lines: &[String]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| !is_subheader(line))
}

fn is_subheader(line: &str) -> bool {
    line.starts_with(SUBHEADER_PREFIX)
}

fn is_footer_marker(trimmed: &str) -> bool {
    FOOTER_MARKERS.iter().any(|m| trimmed.starts_with(m))
}

/// The first `YYYY-MM-DD` token in `line` that is a real calendar date.
fn date_token(line: &str) -> Option<Date> {
    line.as_bytes()
        .windows(10)
        .enumerate()
        .filter(|(_, window)| is_date_shaped(window))
        .find_map(|(start, _)| line[start..start + 10].parse().ok())
}

fn is_date_shaped(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}
