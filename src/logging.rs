//! Diagnostic logging.
//!
//! Everything logs through `tracing`. The binary installs a console layer on
//! stderr and, for the watcher, a file layer that appends one line per event:
//!
//! ```text
//! 2026-02-12 09:30:00 WARNING File disappeared before task creation: a.txt
//! ```
//!
//! `tracing` stops at ERROR, so fatal events are ERROR events sent to the
//! [`CRITICAL`] target and rendered with the `CRITICAL` label.

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use jiff::Zoned;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Target for events that end the process.
pub const CRITICAL: &str = "steward::critical";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. When `log_file` is given
/// but can't be opened, logging continues on the console only.
pub fn init(log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = log_file.and_then(|path| match open_append(path) {
        Ok(file) => Some(
            tfmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .event_format(LogLine),
        ),
        Err(e) => {
            eprintln!(
                "Failed to open log file {}: {e}. Continuing without file logging.",
                path.display()
            );
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tfmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .init();
}

fn open_append(path: &Path) -> io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Formats events as `<timestamp> <LEVEL> <message>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLine;

impl<S, N> FormatEvent<S, N> for LogLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} {} ",
            Zoned::now().strftime(TIMESTAMP_FORMAT),
            level_label(metadata)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_label(metadata: &Metadata<'_>) -> &'static str {
    if metadata.target() == CRITICAL {
        return "CRITICAL";
    }
    match *metadata.level() {
        Level::WARN => "WARNING",
        level => level.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::Arc;

    use jiff::civil::DateTime;
    use tracing::{error, info, warn};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(emit: impl FnOnce()) -> Vec<String> {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .event_format(LogLine)
            .finish();

        tracing::subscriber::with_default(subscriber, emit);

        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn lines_carry_timestamp_level_and_message() {
        let lines = capture(|| {
            info!("New file detected: a.txt");
            warn!("Task already exists: task_a_txt.md");
            error!("Error reading inbox");
        });

        assert_eq!(lines.len(), 3);
        for line in &lines {
            DateTime::strptime(TIMESTAMP_FORMAT, &line[..19]).unwrap();
        }
        assert_eq!(&lines[0][19..], " INFO New file detected: a.txt");
        assert_eq!(&lines[1][19..], " WARNING Task already exists: task_a_txt.md");
        assert_eq!(&lines[2][19..], " ERROR Error reading inbox");
    }

    #[test]
    fn critical_target_gets_its_own_label() {
        let lines = capture(|| {
            error!(target: CRITICAL, "Stopping due to 10 consecutive errors");
        });

        assert_eq!(
            &lines[0][19..],
            " CRITICAL Stopping due to 10 consecutive errors"
        );
    }
}
