//! Board loading, locked edits and selector resolution shared by commands

use anyhow::{bail, Result};

use crate::domain::{Board, Card, Lane, RandomIds};
use crate::storage::BoardDocument;

/// The board document a command operates on
pub struct Session {
    document: BoardDocument,
}

impl Session {
    pub fn new(document: BoardDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    /// Loads the document and builds a fresh board
    pub fn board(&self) -> Result<Board> {
        let ast = self.document.load()?;
        Ok(Board::parse(ast, &mut RandomIds))
    }

    /// Runs one load → edit → save cycle under the document lock
    pub fn edit<T>(&self, apply: impl FnOnce(&mut Board) -> Result<T>) -> Result<T> {
        let _lock = self.document.lock()?;
        let mut board = self.board()?;
        let value = apply(&mut board)?;
        self.document.save(board.ast())?;
        Ok(value)
    }
}

/// Finds a lane by 0-based index, then by exact title
pub fn resolve_lane<'a>(board: &'a Board, selector: &str) -> Result<&'a Lane> {
    let lanes = board.lanes();

    if let Some(lane) = selector.parse::<usize>().ok().and_then(|i| lanes.get(i)) {
        return Ok(lane);
    }

    match lanes.iter().find(|lane| lane.title == selector) {
        Some(lane) => Ok(lane),
        None => bail!("Lane not found: {}", selector),
    }
}

/// Finds a card of `lane` by 0-based index, then by exact title
pub fn resolve_card<'a>(lane: &'a Lane, selector: &str) -> Result<&'a Card> {
    if let Some(card) = selector.parse::<usize>().ok().and_then(|i| lane.cards.get(i)) {
        return Ok(card);
    }

    match lane.cards.iter().find(|card| card.title == selector) {
        Some(card) => Ok(card),
        None => bail!("Card not found in lane '{}': {}", lane.title, selector),
    }
}

/// Resolves a lane and one of its cards to their ids
pub fn resolve_card_ids(board: &Board, lane: &str, card: &str) -> Result<(String, String)> {
    let lane = resolve_lane(board, lane)?;
    let card = resolve_card(lane, card)?;
    Ok((lane.id.clone(), card.id.clone()))
}
