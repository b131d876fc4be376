//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::{card, lane, show, watch};
use crate::storage::{BoardDocument, Config};

#[derive(Parser)]
#[command(name = "mdboard")]
#[command(author, version, about = "Edit a Kanban board kept in a markdown document")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Board document (defaults to `board_file` from .mdboard.toml, then KANBAN.md)
    #[arg(long, short = 'F', global = true, env = "MDBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Output format (defaults to `default_format` from the global config)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board's lanes and cards
    Show,

    /// Print the document re-serialized as markdown
    Render,

    /// Print the document's syntax tree as mdast JSON
    Ast,

    /// Manage lanes
    #[command(subcommand)]
    Lane(lane::LaneCommands),

    /// Manage cards
    #[command(subcommand)]
    Card(card::CardCommands),

    /// Re-print the board whenever the document changes
    Watch,
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default = if verbose { "mdboard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    let path = config.board_path(cli.file.as_deref());
    output.verbose(&format!("Board document: {}", path.display()));
    if let Some(root) = &config.project_root {
        output.verbose(&format!("Project root: {}", root.display()));
    }

    let session = Session::new(BoardDocument::new(path));

    match cli.command {
        Commands::Show => show::show(&output, &session)?,
        Commands::Render => show::render(&output, &session)?,
        Commands::Ast => show::ast(&output, &session)?,
        Commands::Lane(cmd) => lane::run(cmd, &output, &session)?,
        Commands::Card(cmd) => card::run(cmd, &output, &session)?,
        Commands::Watch => watch::run(&output, &session, config.project.watch.debounce())?,
    }

    Ok(())
}
