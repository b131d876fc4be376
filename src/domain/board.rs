//! Board synchronizer
//!
//! A [`Board`] is a Kanban view over a markdown [`Ast`]. Lanes are level-3
//! headings immediately followed by a list; cards are the items of that list.
//!
//! ```text
//! ### Todo            <- lane heading   ┐ lane "Todo"
//!                                       │
//! - Write docs        <- card           │
//!   - In the README   <- description    │
//! - Fix login bug     <- card           ┘
//! ```
//!
//! Parsing assigns every lane and card an opaque id and records which nodes
//! back it. Edit operations go through those lookup tables and mutate the
//! same tree in place, so serializing the tree afterwards keeps everything
//! the board never touched.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::ast::{Ast, AstError, NodeId, NodeKind};
use super::id::IdGenerator;

/// Which lookup table an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Lane,
    Card,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Lane => write!(f, "lane"),
            IdKind::Card => write!(f, "card"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("Unknown {kind} id: {id}")]
    UnknownId { kind: IdKind, id: String },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: IdKind, id: String },

    #[error("Card {card} is not in lane {lane}")]
    CardNotInLane { card: String, lane: String },

    #[error(transparent)]
    MalformedNode(#[from] AstError),
}

impl BoardError {
    fn unknown_lane(id: &str) -> Self {
        BoardError::UnknownId {
            kind: IdKind::Lane,
            id: id.to_string(),
        }
    }

    fn unknown_card(id: &str) -> Self {
        BoardError::UnknownId {
            kind: IdKind::Card,
            id: id.to_string(),
        }
    }

    fn detached_lane(id: &str) -> Self {
        BoardError::MalformedNode(AstError::MalformedNode {
            expected: "heading followed by its list in the document root",
            found: format!("detached lane {}", id),
        })
    }
}

/// A card as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A lane (column) as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    pub title: String,
    pub cards: Vec<Card>,
}

/// Board contents in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub lanes: Vec<Lane>,
}

/// Wire shape handed to presentation layers: `{ "boardData": { "lanes": [...] } }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot<'a> {
    pub board_data: &'a BoardData,
}

/// Nodes backing a lane: its heading and the list right after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneNodes {
    pub heading: NodeId,
    pub list: NodeId,
}

/// A Kanban board bound to the document tree it was parsed from
#[derive(Debug, Clone)]
pub struct Board {
    data: BoardData,
    ast: Ast,
    lane_map: HashMap<String, LaneNodes>,
    card_map: HashMap<String, NodeId>,
}

impl Board {
    /// Builds a board from a document tree.
    ///
    /// Walks the root's children once. A lane heading directly followed by a
    /// list becomes a lane; everything else stays in the tree but is not on
    /// the board. Malformed entries are skipped, never fatal.
    pub fn parse(ast: Ast, ids: &mut impl IdGenerator) -> Self {
        let mut board = Self {
            data: BoardData::default(),
            ast,
            lane_map: HashMap::new(),
            card_map: HashMap::new(),
        };

        let root = board.ast.root();
        let children = board.ast.children(root).to_vec();

        let mut index = 0;
        while index < children.len() {
            let node = children[index];
            let list = children
                .get(index + 1)
                .copied()
                .filter(|&next| board.ast.is_task_list(next));

            match list {
                Some(list) if board.ast.is_lane_heading(node) => {
                    board.parse_lane(node, list, ids);
                    index += 2;
                }
                _ => {
                    if board.ast.is_lane_heading(node) {
                        debug!(index, "Skipping lane heading without a list");
                    }
                    index += 1;
                }
            }
        }

        debug!(
            lanes = board.data.lanes.len(),
            cards = board.card_map.len(),
            nodes = board.ast.node_count(),
            "Parsed board"
        );
        board
    }

    fn parse_lane(&mut self, heading: NodeId, list: NodeId, ids: &mut impl IdGenerator) {
        let title = match self.ast.first_text_value(heading) {
            Ok(title) => title.to_string(),
            Err(e) => {
                debug!(error = %e, "Skipping lane heading without a title");
                return;
            }
        };

        let lane_id = ids.next_id();
        let mut lane = Lane {
            id: lane_id.clone(),
            title,
            cards: Vec::new(),
        };

        let items = self.ast.children(list).to_vec();
        for item in items {
            if let Some(card) = self.parse_card(item, ids) {
                lane.cards.push(card);
            }
        }

        if self
            .lane_map
            .insert(lane_id.clone(), LaneNodes { heading, list })
            .is_some()
        {
            warn!(id = %lane_id, "Id generator repeated a lane id");
        }
        self.data.lanes.push(lane);
    }

    fn parse_card(&mut self, item: NodeId, ids: &mut impl IdGenerator) -> Option<Card> {
        if !matches!(self.ast.kind(item), NodeKind::ListItem) || self.ast.children(item).is_empty()
        {
            debug!("Skipping empty list item");
            return None;
        }

        let Some(title) = self
            .ast
            .item_title_node(item)
            .and_then(|node| self.ast.text_value(node))
        else {
            debug!("Skipping list item without a paragraph title");
            return None;
        };
        let title = title.to_string();

        let description = self
            .ast
            .item_description_node(item)
            .and_then(|node| self.ast.text_value(node))
            .map(str::to_string);

        let id = ids.next_id();
        if self.card_map.insert(id.clone(), item).is_some() {
            warn!(id = %id, "Id generator repeated a card id");
        }

        Some(Card {
            id,
            title,
            description,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the board contents
    pub fn data(&self) -> &BoardData {
        &self.data
    }

    /// Returns the lanes in display order
    pub fn lanes(&self) -> &[Lane] {
        &self.data.lanes
    }

    /// Returns a lane by id
    pub fn lane(&self, lane_id: &str) -> Option<&Lane> {
        self.data.lanes.iter().find(|l| l.id == lane_id)
    }

    /// Returns a card by id
    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.data
            .lanes
            .iter()
            .flat_map(|l| l.cards.iter())
            .find(|c| c.id == card_id)
    }

    /// Returns the wire-shape snapshot for serialization
    pub fn snapshot(&self) -> BoardSnapshot<'_> {
        BoardSnapshot {
            board_data: &self.data,
        }
    }

    /// Returns the document tree backing this board
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Gives the document tree back to the caller
    pub fn into_ast(self) -> Ast {
        self.ast
    }

    /// Looks up the heading and list backing a lane
    pub fn lane_nodes(&self, lane_id: &str) -> Result<LaneNodes, BoardError> {
        self.lane_map
            .get(lane_id)
            .copied()
            .ok_or_else(|| BoardError::unknown_lane(lane_id))
    }

    /// Looks up the list item backing a card
    pub fn card_node(&self, card_id: &str) -> Result<NodeId, BoardError> {
        self.card_map
            .get(card_id)
            .copied()
            .ok_or_else(|| BoardError::unknown_card(card_id))
    }

    fn lane_list(&self, lane_id: &str) -> Result<NodeId, BoardError> {
        let list = self.lane_nodes(lane_id)?.list;
        if !self.ast.is_task_list(list) {
            return Err(AstError::MalformedNode {
                expected: "list",
                found: self.ast.kind(list).type_name().to_string(),
            }
            .into());
        }
        Ok(list)
    }

    /// Index of the lane's heading in the root, checking its list follows it
    fn lane_position(&self, lane_id: &str, nodes: LaneNodes) -> Result<usize, BoardError> {
        let root = self.ast.root();
        let index = self
            .ast
            .position_of(root, nodes.heading)
            .ok_or_else(|| BoardError::detached_lane(lane_id))?;

        if self.ast.child(root, index + 1) != Some(nodes.list) {
            return Err(BoardError::detached_lane(lane_id));
        }
        Ok(index)
    }

    fn lane_mut(&mut self, lane_id: &str) -> Option<&mut Lane> {
        self.data.lanes.iter_mut().find(|l| l.id == lane_id)
    }

    fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.data
            .lanes
            .iter_mut()
            .flat_map(|l| l.cards.iter_mut())
            .find(|c| c.id == card_id)
    }

    // ------------------------------------------------------------------
    // Lane edits
    // ------------------------------------------------------------------

    /// Renames a lane
    pub fn edit_lane_title(&mut self, lane_id: &str, title: &str) -> Result<(), BoardError> {
        let nodes = self.lane_nodes(lane_id)?;
        let text = self.ast.first_text_node(nodes.heading)?;
        *self.ast.text_mut(text)? = title.to_string();

        if let Some(lane) = self.lane_mut(lane_id) {
            lane.title = title.to_string();
        }
        debug!(lane = lane_id, title, "Renamed lane");
        Ok(())
    }

    /// Appends a new, empty lane at the end of the document
    pub fn add_new_lane(&mut self, lane_id: &str, title: &str) -> Result<(), BoardError> {
        if self.lane_map.contains_key(lane_id) {
            return Err(BoardError::DuplicateId {
                kind: IdKind::Lane,
                id: lane_id.to_string(),
            });
        }

        let heading = self.ast.new_lane_heading(title);
        let list = self.ast.new_task_list();
        let root = self.ast.root();
        self.ast.append_child(root, heading);
        self.ast.append_child(root, list);

        self.lane_map
            .insert(lane_id.to_string(), LaneNodes { heading, list });
        self.data.lanes.push(Lane {
            id: lane_id.to_string(),
            title: title.to_string(),
            cards: Vec::new(),
        });
        debug!(lane = lane_id, title, "Added lane");
        Ok(())
    }

    /// Removes a lane's heading and list, along with its cards
    pub fn remove_lane(&mut self, lane_id: &str) -> Result<(), BoardError> {
        let nodes = self.lane_nodes(lane_id)?;
        let index = self.lane_position(lane_id, nodes)?;

        let root = self.ast.root();
        self.ast.remove_child_at(root, index);
        self.ast.remove_child_at(root, index);

        let items: HashSet<NodeId> = self.ast.children(nodes.list).iter().copied().collect();
        self.card_map.retain(|_, item| !items.contains(&*item));
        self.lane_map.remove(lane_id);
        self.data.lanes.retain(|l| l.id != lane_id);

        debug!(lane = lane_id, index, "Removed lane");
        Ok(())
    }

    /// Moves a lane so it becomes the lane at `target_position` (0-based).
    ///
    /// Positions count lanes on the board, not root children: the lane is
    /// inserted right before the lane currently at that position, or at the
    /// end of the document when there are not that many other lanes.
    pub fn move_lane(&mut self, lane_id: &str, target_position: usize) -> Result<(), BoardError> {
        let nodes = self.lane_nodes(lane_id)?;
        let index = self.lane_position(lane_id, nodes)?;

        let root = self.ast.root();
        self.ast.remove_child_at(root, index);
        self.ast.remove_child_at(root, index);

        let pairs: HashMap<NodeId, NodeId> = self
            .lane_map
            .values()
            .map(|n| (n.heading, n.list))
            .collect();

        let children = self.ast.children(root);
        let mut insert_at = children.len();
        let mut seen = 0;
        let mut i = 0;
        while i < children.len() {
            let is_lane = pairs
                .get(&children[i])
                .is_some_and(|list| children.get(i + 1) == Some(list));

            if is_lane {
                if seen == target_position {
                    insert_at = i;
                    break;
                }
                seen += 1;
                i += 2;
            } else {
                i += 1;
            }
        }

        self.ast.insert_child(root, insert_at, nodes.heading);
        self.ast.insert_child(root, insert_at + 1, nodes.list);

        if let Some(from) = self.data.lanes.iter().position(|l| l.id == lane_id) {
            let lane = self.data.lanes.remove(from);
            let to = target_position.min(self.data.lanes.len());
            self.data.lanes.insert(to, lane);
        }

        debug!(lane = lane_id, target_position, insert_at, "Moved lane");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Card edits
    // ------------------------------------------------------------------

    /// Renames a card
    pub fn edit_task_name(&mut self, card_id: &str, title: &str) -> Result<(), BoardError> {
        let item = self.card_node(card_id)?;
        let text = self.ast.first_text_node(item)?;
        *self.ast.text_mut(text)? = title.to_string();

        if let Some(card) = self.card_mut(card_id) {
            card.title = title.to_string();
        }
        debug!(card = card_id, title, "Renamed card");
        Ok(())
    }

    /// Renames a card (same as [`Board::edit_task_name`])
    pub fn edit_card_title(&mut self, card_id: &str, title: &str) -> Result<(), BoardError> {
        self.edit_task_name(card_id, title)
    }

    /// Appends a new card at the end of a lane
    pub fn add_new_task(
        &mut self,
        lane_id: &str,
        card_id: &str,
        title: &str,
    ) -> Result<(), BoardError> {
        let list = self.lane_list(lane_id)?;
        if self.card_map.contains_key(card_id) {
            return Err(BoardError::DuplicateId {
                kind: IdKind::Card,
                id: card_id.to_string(),
            });
        }

        let item = self.ast.new_task_item(title);
        self.ast.append_child(list, item);
        self.card_map.insert(card_id.to_string(), item);

        if let Some(lane) = self.lane_mut(lane_id) {
            lane.cards.push(Card {
                id: card_id.to_string(),
                title: title.to_string(),
                description: None,
            });
        }
        debug!(lane = lane_id, card = card_id, title, "Added card");
        Ok(())
    }

    /// Removes a card from its lane
    pub fn remove_task(&mut self, lane_id: &str, card_id: &str) -> Result<(), BoardError> {
        let item = self.card_node(card_id)?;
        let list = self.lane_list(lane_id)?;
        let index = self
            .ast
            .position_of(list, item)
            .ok_or_else(|| BoardError::CardNotInLane {
                card: card_id.to_string(),
                lane: lane_id.to_string(),
            })?;

        self.ast.remove_child_at(list, index);
        self.card_map.remove(card_id);

        if let Some(lane) = self.lane_mut(lane_id) {
            lane.cards.retain(|c| c.id != card_id);
        }
        debug!(lane = lane_id, card = card_id, "Removed card");
        Ok(())
    }

    /// Moves a card to `position` within the target lane.
    ///
    /// The list item itself is relocated, so the card keeps its id and any
    /// content nested under it. `position` indexes the target list's items
    /// (skipped items included) and is clamped to its length. The card's
    /// place in the snapshot follows the item's place among card items.
    pub fn move_card(
        &mut self,
        card_id: &str,
        source_lane_id: &str,
        target_lane_id: &str,
        position: usize,
    ) -> Result<(), BoardError> {
        let item = self.card_node(card_id)?;
        let source = self.lane_list(source_lane_id)?;
        let target = self.lane_list(target_lane_id)?;

        self.ast
            .detach(source, item)
            .ok_or_else(|| BoardError::CardNotInLane {
                card: card_id.to_string(),
                lane: source_lane_id.to_string(),
            })?;
        self.ast.insert_child(target, position, item);
        let to = self
            .ast
            .children(target)
            .iter()
            .take_while(|&&child| child != item)
            .filter(|child| self.card_map.values().any(|mapped| mapped == *child))
            .count();

        let card = self.lane_mut(source_lane_id).and_then(|lane| {
            let from = lane.cards.iter().position(|c| c.id == card_id)?;
            Some(lane.cards.remove(from))
        });
        if let (Some(card), Some(lane)) = (card, self.lane_mut(target_lane_id)) {
            lane.cards.insert(to.min(lane.cards.len()), card);
        }

        debug!(
            card = card_id,
            from = source_lane_id,
            to = target_lane_id,
            position,
            "Moved card"
        );
        Ok(())
    }

    /// Sets a card's description, creating the nested description item if
    /// the card has none yet
    pub fn edit_card_description(
        &mut self,
        card_id: &str,
        description: &str,
    ) -> Result<(), BoardError> {
        let item = self.card_node(card_id)?;
        match self.ast.item_description_node(item) {
            Some(text) => *self.ast.text_mut(text)? = description.to_string(),
            None => {
                self.ast.attach_description(item, description)?;
            }
        }

        if let Some(card) = self.card_mut(card_id) {
            card.description = Some(description.to_string());
        }
        debug!(card = card_id, "Edited card description");
        Ok(())
    }
}
