//! Lane CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{resolve_lane, Session};
use crate::domain::generate_id;

#[derive(Subcommand)]
pub enum LaneCommands {
    /// Append a lane at the end of the board
    Add {
        /// Lane title
        title: String,
    },

    /// Change a lane's title
    Rename {
        /// Lane index or title
        lane: String,

        /// New title
        title: String,
    },

    /// Remove a lane and all of its cards
    Remove {
        /// Lane index or title
        lane: String,
    },

    /// Move a lane to another position
    ///
    /// Examples:
    ///   mdboard lane move Done 0      # Make "Done" the first lane
    ///   mdboard lane move 0 99        # Move the first lane to the end
    Move {
        /// Lane index or title
        lane: String,

        /// Target position (0-based, clamped to the end)
        position: usize,
    },
}

pub fn run(cmd: LaneCommands, output: &Output, session: &Session) -> Result<()> {
    match cmd {
        LaneCommands::Add { title } => add_lane(output, session, &title),
        LaneCommands::Rename { lane, title } => rename_lane(output, session, &lane, &title),
        LaneCommands::Remove { lane } => remove_lane(output, session, &lane),
        LaneCommands::Move { lane, position } => move_lane(output, session, &lane, position),
    }
}

fn add_lane(output: &Output, session: &Session, title: &str) -> Result<()> {
    session.edit(|board| {
        let id = generate_id();
        output.verbose_ctx("lane", &format!("Adding lane {} as {}", title, id));
        board.add_new_lane(&id, title)?;
        Ok(())
    })?;

    output.success(&format!("Added lane: {}", title));
    Ok(())
}

fn rename_lane(output: &Output, session: &Session, selector: &str, title: &str) -> Result<()> {
    let old = session.edit(|board| {
        let lane = resolve_lane(board, selector)?;
        let (id, old) = (lane.id.clone(), lane.title.clone());
        board.edit_lane_title(&id, title)?;
        Ok(old)
    })?;

    output.success(&format!("Renamed lane: {} -> {}", old, title));
    Ok(())
}

fn remove_lane(output: &Output, session: &Session, selector: &str) -> Result<()> {
    let (title, cards) = session.edit(|board| {
        let lane = resolve_lane(board, selector)?;
        let (id, title, cards) = (lane.id.clone(), lane.title.clone(), lane.cards.len());
        board.remove_lane(&id)?;
        Ok((title, cards))
    })?;

    output.success(&format!("Removed lane: {} ({} card(s))", title, cards));
    Ok(())
}

fn move_lane(output: &Output, session: &Session, selector: &str, position: usize) -> Result<()> {
    let (title, index) = session.edit(|board| {
        let lane = resolve_lane(board, selector)?;
        let (id, title) = (lane.id.clone(), lane.title.clone());
        board.move_lane(&id, position)?;

        let index = board
            .lanes()
            .iter()
            .position(|lane| lane.id == id)
            .unwrap_or(position);
        Ok((title, index))
    })?;

    output.success(&format!("Moved lane: {} to position {}", title, index));
    Ok(())
}
