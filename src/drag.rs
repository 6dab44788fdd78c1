//! Boundary toward the drag-and-drop collaborator.
//!
//! The collaborator asks [`DragHooks::on_move_proposed`] before letting a card
//! leave its list, and reports every accepted drop through
//! [`DragHooks::on_move_committed`].

use crate::error::Result;
use crate::types::model::Bucket;

/// One card list on the board: a bucket inside a question's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId {
    pub row: usize,
    pub bucket: Bucket,
}

impl ContainerId {
    pub fn new(row: usize, bucket: Bucket) -> Self {
        Self { row, bucket }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveProposal {
    pub from: ContainerId,
    pub to: ContainerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommit {
    pub item: String,
    pub from: ContainerId,
    pub to: ContainerId,
    pub new_index: usize,
}

/// Result of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub row: usize,
    pub from: Bucket,
    pub to: Bucket,
    pub position: usize,
    pub rank: Option<u32>,
}

/// Row-lock rule: cards only travel between lists of the same question.
pub fn can_accept(source_row: usize, target_row: usize) -> bool {
    source_row == target_row
}

pub trait DragHooks {
    fn on_move_proposed(&self, proposal: &MoveProposal) -> bool {
        can_accept(proposal.from.row, proposal.to.row)
    }

    fn on_move_committed(&mut self, commit: &MoveCommit) -> Result<MoveOutcome>;
}
