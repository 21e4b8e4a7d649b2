mod cli;
mod config;
mod layout;
mod logging;
mod rotate;
mod shutdown;
mod task;
mod watch;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
