//! Regenerate the live system log after archiving.

use jiff::civil::{Date, DateTime};

use super::parse::{ACTIVITY_MARKER, LogDocument, NO_ACTIVITY, STATUS_MARKER, entry_lines};

/// What the rewritten log keeps besides header and footer.
#[derive(Debug, Clone, Copy)]
pub struct Retain<'a> {
    pub today: Date,

    /// Past dates whose archive could not be confirmed.
    pub unarchived: &'a [Date],

    /// Dates archived by this run, for the status block.
    pub archived_count: usize,
}

/// Render the full replacement document.
///
/// Today's entries sit under a `### <today>` sub-header so the result parses
/// back into the same section on the next run.
pub fn render(doc: &LogDocument, retain: Retain<'_>, now: DateTime) -> String {
    let mut out = doc.header.concat();
    end_line(&mut out);

    out.push_str(&status_block(retain.today, now, retain.archived_count));
    out.push_str(ACTIVITY_MARKER);
    out.push_str("\n\n");

    for &date in retain.unarchived {
        if let Some(lines) = doc.section(date) {
            push_section(&mut out, date, lines);
        }
    }

    match doc.section(retain.today) {
        Some(lines) => push_section(&mut out, retain.today, lines),
        None if retain.unarchived.is_empty() => {
            out.push_str(NO_ACTIVITY);
            out.push_str("\n\n");
        }
        None => {}
    }

    out.push_str(&doc.footer.concat());
    out
}

fn status_block(today: Date, now: DateTime, archived_count: usize) -> String {
    let time = now.strftime("%H:%M:%S");
    format!(
        "{STATUS_MARKER}\n\n\
         - **Last Rotation:** {today} at {time}\n\
         - **Entries Archived:** {archived_count} date(s)\n\
         - **Archive Location:** [Logs/](Logs/) folder\n\
         - **Retention:** All logs permanently archived\n\n\
         ---\n\n"
    )
}

fn push_section(out: &mut String, date: Date, lines: &[String]) {
    out.push_str(&format!("### {date}\n"));
    out.extend(entry_lines(lines));
    end_line(out);
}

/// Terminate a trailing partial line so the next block starts cleanly.
fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn now() -> DateTime {
        date(2026, 2, 12).at(18, 45, 0, 0)
    }

    fn retain(unarchived: &[Date], archived_count: usize) -> Retain<'_> {
        Retain {
            today: date(2026, 2, 12),
            unarchived,
            archived_count,
        }
    }

    const LOG: &str = "\
# System Log

## Activity Log

### 2026-02-11
- old

### 2026-02-12
- new

## Notes
n
";

    #[test]
    fn keeps_only_today_by_default() {
        let doc = LogDocument::parse(LOG);
        let text = render(&doc, retain(&[], 1), now());

        let expected = "\
# System Log

## Log Rotation Status

- **Last Rotation:** 2026-02-12 at 18:45:00
- **Entries Archived:** 1 date(s)
- **Archive Location:** [Logs/](Logs/) folder
- **Retention:** All logs permanently archived

---

## Activity Log

### 2026-02-12
- new

## Notes
n
";
        assert_eq!(text, expected);
    }

    #[test]
    fn unarchived_dates_stay_in_the_log() {
        let doc = LogDocument::parse(LOG);
        let text = render(&doc, retain(&[date(2026, 2, 11)], 0), now());

        assert!(text.contains("## Activity Log\n\n### 2026-02-11\n- old\n\n### 2026-02-12\n- new\n"));
    }

    #[test]
    fn placeholder_when_today_is_empty() {
        let doc = LogDocument::parse("# Log\n## Activity Log\n### 2026-02-11\n- old\n## Notes\n");
        let text = render(&doc, retain(&[], 1), now());

        assert!(text.contains("## Activity Log\n\n*No activity logged today.*\n\n## Notes\n"));
    }

    #[test]
    fn rendered_log_parses_back_to_the_same_parts() {
        let doc = LogDocument::parse(LOG);
        let text = render(&doc, retain(&[], 1), now());
        let reparsed = LogDocument::parse(&text);

        assert_eq!(reparsed.header, doc.header);
        assert_eq!(reparsed.footer, doc.footer);
        assert_eq!(
            reparsed.section(date(2026, 2, 12)),
            doc.section(date(2026, 2, 12))
        );
        assert_eq!(reparsed.sections.len(), 1);
        assert_eq!(reparsed.dropped_lines, 0);
    }

    #[test]
    fn partial_last_header_line_is_terminated() {
        let doc = LogDocument::parse("no newline at end");
        let text = render(&doc, retain(&[], 0), now());

        assert!(text.starts_with("no newline at end\n## Log Rotation Status\n"));
    }
}
