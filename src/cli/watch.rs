//! Live board view
//!
//! Watches the board document's directory and re-parses the document into a
//! fresh board on every change. The directory is watched rather than the file
//! because saves replace the file by renaming over it.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use tracing::{debug, warn};

use super::output::Output;
use super::session::Session;
use super::show::print_board;

pub fn run(output: &Output, session: &Session, debounce: Duration) -> Result<()> {
    let path = session.document().path();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    refresh(output, session);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(debounce, tx)?;
    debouncer
        .watcher()
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    output.verbose_ctx(
        "watch",
        &format!(
            "Watching {} (debounce: {}ms)",
            path.display(),
            debounce.as_millis()
        ),
    );

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events
                    .iter()
                    .any(|e| e.path.file_name() == path.file_name());
                if !changed {
                    continue;
                }

                debug!(events = events.len(), "board document changed");
                refresh(output, session);
            }
            Ok(Err(e)) => warn!(error = %e, "watch error"),
            Err(_) => break,
        }
    }

    Ok(())
}

/// Prints a freshly parsed board, reporting load failures without exiting
fn refresh(output: &Output, session: &Session) {
    match session.board() {
        Ok(board) => print_board(output, &board),
        Err(e) => output.error(&format!("{:#}", e)),
    }
}
