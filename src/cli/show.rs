//! Read-only board commands: `show`, `render`, `ast`

use anyhow::Result;

use super::output::Output;
use super::session::Session;
use crate::domain::Board;
use crate::storage::{render_markdown, to_json};

pub fn show(output: &Output, session: &Session) -> Result<()> {
    let board = session.board()?;
    output.verbose_ctx(
        "show",
        &format!("Parsed {} lane(s)", board.lanes().len()),
    );
    print_board(output, &board);
    Ok(())
}

/// Prints the board as a text listing or as its wire-shape snapshot
pub fn print_board(output: &Output, board: &Board) {
    if output.is_json() {
        output.data(&board.snapshot());
        return;
    }

    if board.lanes().is_empty() {
        println!("No lanes");
        return;
    }

    for (i, lane) in board.lanes().iter().enumerate() {
        println!("[{}] {} ({})", i, lane.title, lane.cards.len());
        for (j, card) in lane.cards.iter().enumerate() {
            println!("    {:>2}. {}", j, card.title);
            if let Some(description) = &card.description {
                println!("        {}", description);
            }
        }
    }
}

pub fn render(output: &Output, session: &Session) -> Result<()> {
    let board = session.board()?;
    let markdown = render_markdown(board.ast());

    if output.is_json() {
        output.data(&serde_json::json!({ "markdown": markdown }));
    } else {
        print!("{}", markdown);
    }
    Ok(())
}

pub fn ast(output: &Output, session: &Session) -> Result<()> {
    let ast = session.document().load()?;
    output.data(&to_json(&ast));
    Ok(())
}
