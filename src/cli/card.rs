//! Card CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{resolve_card_ids, resolve_lane, Session};
use crate::domain::generate_id;

#[derive(Subcommand)]
pub enum CardCommands {
    /// Append a card to a lane
    ///
    /// Examples:
    ///   mdboard card add Todo "Fix typo"
    ///   mdboard card add 0 "Build API" -d "REST endpoints for lanes"
    Add {
        /// Lane index or title
        lane: String,

        /// Card title
        title: String,

        /// Card description (stored as a nested single-item list)
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Change a card's title
    Rename {
        /// Lane index or title
        lane: String,

        /// Card index or title within the lane
        card: String,

        /// New title
        title: String,
    },

    /// Remove a card from its lane
    Remove {
        /// Lane index or title
        lane: String,

        /// Card index or title within the lane
        card: String,
    },

    /// Move a card within its lane or to another lane
    Move {
        /// Source lane index or title
        lane: String,

        /// Card index or title within the source lane
        card: String,

        /// Target lane index or title
        target_lane: String,

        /// Position in the target lane (0-based, clamped to the end)
        position: usize,
    },

    /// Set a card's description
    Describe {
        /// Lane index or title
        lane: String,

        /// Card index or title within the lane
        card: String,

        /// Description text
        text: String,
    },
}

pub fn run(cmd: CardCommands, output: &Output, session: &Session) -> Result<()> {
    match cmd {
        CardCommands::Add {
            lane,
            title,
            description,
        } => add_card(output, session, &lane, &title, description.as_deref()),
        CardCommands::Rename { lane, card, title } => {
            rename_card(output, session, &lane, &card, &title)
        }
        CardCommands::Remove { lane, card } => remove_card(output, session, &lane, &card),
        CardCommands::Move {
            lane,
            card,
            target_lane,
            position,
        } => move_card(output, session, &lane, &card, &target_lane, position),
        CardCommands::Describe { lane, card, text } => {
            describe_card(output, session, &lane, &card, &text)
        }
    }
}

fn add_card(
    output: &Output,
    session: &Session,
    lane_selector: &str,
    title: &str,
    description: Option<&str>,
) -> Result<()> {
    let lane_title = session.edit(|board| {
        let lane = resolve_lane(board, lane_selector)?;
        let (lane_id, lane_title) = (lane.id.clone(), lane.title.clone());

        let card_id = generate_id();
        output.verbose_ctx("card", &format!("Adding card {} to {} as {}", title, lane_title, card_id));
        board.add_new_task(&lane_id, &card_id, title)?;
        if let Some(description) = description {
            board.edit_card_description(&card_id, description)?;
        }
        Ok(lane_title)
    })?;

    output.success(&format!("Added card: {} to {}", title, lane_title));
    Ok(())
}

fn rename_card(
    output: &Output,
    session: &Session,
    lane: &str,
    card: &str,
    title: &str,
) -> Result<()> {
    session.edit(|board| {
        let (_, card_id) = resolve_card_ids(board, lane, card)?;
        board.edit_card_title(&card_id, title)?;
        Ok(())
    })?;

    output.success(&format!("Renamed card: {} -> {}", card, title));
    Ok(())
}

fn remove_card(output: &Output, session: &Session, lane: &str, card: &str) -> Result<()> {
    let title = session.edit(|board| {
        let (lane_id, card_id) = resolve_card_ids(board, lane, card)?;
        let title = board
            .card(&card_id)
            .map(|c| c.title.clone())
            .unwrap_or_default();
        board.remove_task(&lane_id, &card_id)?;
        Ok(title)
    })?;

    output.success(&format!("Removed card: {}", title));
    Ok(())
}

fn move_card(
    output: &Output,
    session: &Session,
    lane: &str,
    card: &str,
    target_lane: &str,
    position: usize,
) -> Result<()> {
    let (title, target_title) = session.edit(|board| {
        let (lane_id, card_id) = resolve_card_ids(board, lane, card)?;
        let target = resolve_lane(board, target_lane)?;
        let (target_id, target_title) = (target.id.clone(), target.title.clone());
        let title = board
            .card(&card_id)
            .map(|c| c.title.clone())
            .unwrap_or_default();

        output.verbose_ctx(
            "card",
            &format!("Moving {} from {} to {} at {}", card_id, lane_id, target_id, position),
        );
        board.move_card(&card_id, &lane_id, &target_id, position)?;
        Ok((title, target_title))
    })?;

    output.success(&format!("Moved card: {} to {}", title, target_title));
    Ok(())
}

fn describe_card(
    output: &Output,
    session: &Session,
    lane: &str,
    card: &str,
    text: &str,
) -> Result<()> {
    let title = session.edit(|board| {
        let (_, card_id) = resolve_card_ids(board, lane, card)?;
        board.edit_card_description(&card_id, text)?;
        Ok(board
            .card(&card_id)
            .map(|c| c.title.clone())
            .unwrap_or_default())
    })?;

    output.success(&format!("Updated description: {}", title));
    Ok(())
}
