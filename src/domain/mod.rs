//! Domain models for mdboard
//!
//! Contains the document tree and the board synchronizer, without any I/O
//! concerns.

mod ast;
mod board;
mod id;

pub use ast::{Ast, AstError, NodeId, NodeKind, Opaque, LANE_HEADING_DEPTH};
pub use board::{Board, BoardData, BoardError, BoardSnapshot, Card, IdKind, Lane, LaneNodes};
pub use id::{generate_id, IdGenerator, RandomIds, SequentialIds};
