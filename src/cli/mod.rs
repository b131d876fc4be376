//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | View | Inspect the document | `show`, `render`, `ast`, `watch` |
//! | Lane | Edit lanes | `lane add`, `lane rename`, `lane move` |
//! | Card | Edit cards | `card add`, `card move`, `card describe` |
//!
//! Lanes and cards are selected by 0-based index or exact title. Ids are
//! regenerated on every parse, so they never appear on the command line.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; `RUST_LOG` tunes the log
//! filter further:
//! ```bash
//! mdboard --verbose card move Todo 0 Done 0
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod session;
mod show;
mod lane;
mod card;
mod watch;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
