//! # Storage Layer
//!
//! Reading and writing board documents.
//!
//! ## Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Board | Markdown | `KANBAN.md` (configurable) |
//! | Board | mdast JSON | any `*.json` board file |
//! | Config | TOML | `.mdboard.toml`, `~/.config/mdboard/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`BoardDocument::lock`] takes an exclusive `fs2` lock on `<file>.lock`
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`BoardDocument`] - Load/save a board document in either format
//! - [`Config`] - Project and global configuration

pub mod markdown;
pub mod mdast;
mod config;
mod document;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, WatchConfig,
    DEFAULT_BOARD_FILE, PROJECT_CONFIG_FILE,
};
pub use document::{BoardDocument, DocumentError, DocumentFormat, DocumentLock};
pub use markdown::{parse_markdown, render_markdown, unescape_brackets};
pub use mdast::{from_json, parse_mdast, to_json, MdastError};
