//! mdboard - Kanban boards in markdown documents

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mdboard::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
