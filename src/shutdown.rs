//! Interrupt handling for the watcher.
//!
//! The first SIGINT or SIGTERM raises a shared flag that the watch loop
//! polls between cycles. A second signal, arriving while the loop is still
//! winding down, exits the process immediately with status 1.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;

/// Install handlers and return the flag they raise.
pub fn register() -> io::Result<Arc<AtomicBool>> {
    let requested = Arc::new(AtomicBool::new(false));

    for signal in [SIGINT, SIGTERM] {
        // Registered first so it sees the flag as it was before this signal.
        flag::register_conditional_shutdown(signal, 1, Arc::clone(&requested))?;
        flag::register(signal, Arc::clone(&requested))?;
    }

    Ok(requested)
}
