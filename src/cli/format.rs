//! Output formatting for CLI display.

use crate::rotate::RotationReport;
use crate::watch::WatchOutcome;

/// Format the line printed when the watcher stops.
pub(super) fn format_watch_outcome(outcome: &WatchOutcome) -> String {
    match outcome {
        WatchOutcome::Interrupted { seen } => {
            format!("File watcher stopped. Total files seen: {seen}")
        }
        WatchOutcome::Fatal {
            consecutive_failures,
        } => format!("File watcher stopped after {consecutive_failures} consecutive failed cycles"),
    }
}

/// Format a rotation summary, one fact per line.
pub(super) fn format_rotation(report: &RotationReport) -> String {
    let mut lines = vec![format!(
        "Rotation for {}: {} date section(s) found",
        report.today, report.sections_found
    )];

    if report.archived.is_empty() {
        lines.push("Nothing to archive".to_string());
    } else {
        lines.push(format!(
            "Archived {} date(s): {}",
            report.archived.len(),
            join_dates(&report.archived)
        ));
    }

    if !report.retained.is_empty() {
        lines.push(format!(
            "Kept in the live log after failed archive: {}",
            join_dates(&report.retained)
        ));
    }

    lines.push(if report.today_entries {
        "Today's entries kept".to_string()
    } else {
        "No entries for today".to_string()
    });

    lines.push(match &report.backup {
        Some(path) => format!("Backup: {}", path.display()),
        None => "Backup: none".to_string(),
    });

    if report.dropped_lines > 0 {
        lines.push(format!(
            "Dropped {} line(s) outside any dated section",
            report.dropped_lines
        ));
    }

    lines.join("\n")
}

fn join_dates(dates: &[jiff::civil::Date]) -> String {
    dates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
