//! The watcher loop: poll the inbox, emit one task per new file.
//!
//! Single-threaded and cooperative. Each cycle lists the inbox, emits a task
//! for every name not yet in the seen-set, and then sleeps. The sleep is the
//! only point where a shutdown request is noticed mid-wait.
//!
//! Files already in the inbox when the watcher starts are treated as handled:
//! the initial scan marks them seen without emitting tasks.

mod inbox;
mod seen;

pub use inbox::Inbox;

use inbox::WatchedFile;
use seen::SeenSet;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use jiff::Zoned;
use tracing::{error, info, warn};

use crate::config::WatchSettings;
use crate::logging::CRITICAL;
use crate::task::{Emission, TaskEmitter};

/// Granularity at which the interval sleep checks for shutdown.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// A cycle that could not run at all.
///
/// Only these count toward the consecutive-failure threshold. An unreadable
/// inbox is not one of them: that cycle simply detects nothing.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("task directory {0} is missing")]
    TaskDirMissing(PathBuf),

    #[error("task directory {0} is not a directory")]
    TaskDirNotADirectory(PathBuf),
}

/// What one poll cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub detected: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub listing_failed: bool,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Shutdown was requested; `seen` is the final seen-set size.
    Interrupted { seen: usize },

    /// Too many consecutive cycles failed.
    Fatal { consecutive_failures: u32 },
}

/// Watches one inbox and owns its seen-set and failure counter.
#[derive(Debug)]
pub struct Watcher {
    inbox: Inbox,
    emitter: TaskEmitter,
    settings: WatchSettings,
    seen: SeenSet,
}

impl Watcher {
    pub fn new(inbox: Inbox, emitter: TaskEmitter, settings: WatchSettings) -> Self {
        Self {
            inbox,
            emitter,
            settings,
            seen: SeenSet::new(),
        }
    }

    /// Mark every file currently in the inbox as seen, without emitting.
    ///
    /// A failed listing leaves the seen-set empty; the loop still starts.
    pub fn prime(&mut self) -> usize {
        match self.inbox.list() {
            Ok(files) => {
                for file in &files {
                    self.seen.insert(&file.name);
                }
                if self.seen.is_empty() {
                    info!("Initial scan complete: inbox is empty");
                } else {
                    info!(
                        "Initial scan complete: {} existing file(s) in {} marked as handled",
                        self.seen.len(),
                        self.inbox.path().display()
                    );
                }
            }
            Err(e) => {
                error!("Error during initial scan: {e}");
                warn!("Continuing with an empty seen-set");
            }
        }
        self.seen.len()
    }

    /// Run one poll cycle.
    ///
    /// Every new name is added to the seen-set after its emission attempt,
    /// whether or not the task was written, so a file that always fails is
    /// not retried every cycle.
    pub fn poll(&mut self) -> Result<CycleReport, WatchError> {
        self.check_task_dir()?;

        let mut report = CycleReport::default();

        let files = match self.inbox.list() {
            Ok(files) => files,
            Err(e) => {
                error!(
                    "Error reading inbox {}: {e}",
                    self.inbox.path().display()
                );
                report.listing_failed = true;
                return Ok(report);
            }
        };

        let new_files: Vec<WatchedFile> = files
            .into_iter()
            .filter(|f| !self.seen.contains(&f.name))
            .collect();

        for file in &new_files {
            report.detected += 1;
            info!(size_bytes = file.size_bytes, "New file detected: {}", file.name);

            let detected_at = Zoned::now().datetime();
            match self.emitter.emit(&file.name, detected_at) {
                Ok(Emission::Created { path, size }) => {
                    report.created += 1;
                    info!(
                        "Created task: {} for {} ({})",
                        path.display(),
                        file.name,
                        size.human()
                    );
                }
                Ok(Emission::Skipped(path)) => {
                    report.skipped += 1;
                    info!(
                        "Task already exists for {}, skipping: {}",
                        file.name,
                        path.display()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Error creating task for {}: {e}", file.name);
                    warn!("Marked {} as seen despite task creation failure", file.name);
                }
            }
            self.seen.insert(&file.name);
        }

        Ok(report)
    }

    /// Prime, then poll until shutdown or the failure threshold.
    pub fn run(&mut self, shutdown: &AtomicBool) -> WatchOutcome {
        self.prime();

        let mut consecutive_failures = 0;
        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!(
                    "File watcher stopped. Files seen: {}",
                    self.seen.len()
                );
                return WatchOutcome::Interrupted {
                    seen: self.seen.len(),
                };
            }

            match self.poll() {
                Ok(report) => {
                    consecutive_failures = 0;
                    if report.listing_failed {
                        warn!("Inbox unavailable, retrying next cycle");
                    } else if report.detected > 0 {
                        info!(
                            "Cycle done: {} created, {} skipped, {} failed",
                            report.created, report.skipped, report.failed
                        );
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    error!("Error in watch cycle (count: {consecutive_failures}): {e}");

                    if consecutive_failures >= self.settings.failure_threshold {
                        error!(
                            target: CRITICAL,
                            "Stopping due to {consecutive_failures} consecutive errors"
                        );
                        return WatchOutcome::Fatal {
                            consecutive_failures,
                        };
                    }
                }
            }

            sleep_unless_shutdown(self.settings.poll_interval, shutdown);
        }
    }

    fn check_task_dir(&self) -> Result<(), WatchError> {
        let dir = self.emitter.task_dir();
        if dir.is_dir() {
            Ok(())
        } else if dir.exists() {
            Err(WatchError::TaskDirNotADirectory(dir.to_path_buf()))
        } else {
            Err(WatchError::TaskDirMissing(dir.to_path_buf()))
        }
    }
}

/// Sleep for `interval`, waking early if shutdown is requested.
fn sleep_unless_shutdown(interval: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + interval;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
