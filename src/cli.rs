//! CLI interface for Steward.
//!
//! Two subcommands share one root directory:
//!
//! - `steward watch` — poll `Inbox/` and write review tasks to `Needs_Action/`.
//! - `steward rotate` — archive past days of `System_Log.md` into `Logs/`.
//!
//! `--root` defaults to the current directory.

mod format;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jiff::Zoned;
use tracing::{error, info};

use crate::config::{WatchOverrides, WatchSettings};
use crate::layout::Layout;
use crate::rotate::Rotator;
use crate::task::TaskEmitter;
use crate::watch::{Inbox, Watcher};
use crate::{logging, shutdown};

use format::{format_rotation, format_watch_outcome};

/// Exit status of a rotation that kept some dates because their archive failed.
const EXIT_PARTIAL: u8 = 2;

/// Steward: keep an inbox triaged and a system log rotated.
#[derive(Debug, Parser)]
#[command(name = "steward", after_long_help = LAYOUT_HELP)]
pub struct Cli {
    /// Directory holding Inbox/, Needs_Action/, System_Log.md and Logs/.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const LAYOUT_HELP: &str = r"Layout under --root:
  Inbox/               files dropped here become tasks
  Needs_Action/        one task_<name>.md per detected file
  watcher_errors.log   watcher diagnostics
  System_Log.md        live activity log
  Logs/                one <YYYY-MM-DD>.md archive per past day
  Logs/backups/        snapshot of System_Log.md per rotation
  steward.toml         optional settings (poll-interval-secs, failure-threshold)";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the inbox until interrupted.
    ///
    /// Files present at startup are treated as already handled.
    Watch {
        /// Seconds between inbox polls.
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Consecutive failed cycles before the watcher gives up.
        #[arg(long, value_name = "N")]
        failure_threshold: Option<u32>,
    },

    /// Archive every dated section except today's.
    ///
    /// Exits 2 when a date had to stay in the live log because its archive
    /// could not be written.
    Rotate,
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<ExitCode, String> {
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir()
            .map_err(|e| format!("failed to resolve current directory: {e}"))?,
    };
    let layout = Layout::new(root);

    match cli.command {
        Command::Watch {
            interval,
            failure_threshold,
        } => cmd_watch(
            &layout,
            WatchOverrides {
                poll_interval_secs: interval,
                failure_threshold,
            },
        ),
        Command::Rotate => cmd_rotate(layout),
    }
}

fn cmd_watch(layout: &Layout, overrides: WatchOverrides) -> Result<ExitCode, String> {
    logging::init(Some(&layout.watcher_log()));

    let settings = WatchSettings::load(&layout.config_file(), overrides)
        .map_err(|e| startup_failure(&e))?;
    layout.ensure_watch_dirs().map_err(|e| startup_failure(&e))?;
    let shutdown = shutdown::register()
        .map_err(|e| startup_failure(&format!("failed to install signal handlers: {e}")))?;

    info!("Starting file watcher in {}", layout.root().display());
    info!(
        "Monitoring {} every {}s, tasks go to {}",
        layout.inbox().display(),
        settings.poll_interval.as_secs(),
        layout.needs_action().display()
    );

    let mut watcher = Watcher::new(
        Inbox::new(layout.inbox()),
        TaskEmitter::new(layout.inbox(), layout.needs_action()),
        settings,
    );
    let outcome = watcher.run(&shutdown);

    println!("{}", format_watch_outcome(&outcome));
    Ok(ExitCode::SUCCESS)
}

fn cmd_rotate(layout: Layout) -> Result<ExitCode, String> {
    logging::init(None);

    info!("Rotating {}", layout.system_log().display());
    let report = Rotator::new(layout)
        .rotate(Zoned::now().datetime())
        .map_err(|e| e.to_string())?;

    println!("{}", format_rotation(&report));
    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

/// Log a startup failure and turn it into the CLI's error message.
fn startup_failure(e: &impl fmt::Display) -> String {
    let message = e.to_string();
    error!("Cannot start watcher: {message}");
    message
}
