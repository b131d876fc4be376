//! mdboard - A Kanban board that lives in a markdown document
//!
//! Lanes are level-3 headings, each followed by a list whose items are the
//! lane's cards. A [`Board`] parses a document tree into that view and keeps
//! the tree in sync as lanes and cards are edited, so the document can be
//! written back with everything else in it untouched.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Ast, Board, BoardData, BoardError, Card, IdGenerator, Lane, NodeId};
