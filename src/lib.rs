//! Rating board engine: items are dragged from an unsorted pool into ordered
//! scale buckets, one row per question, and ranked per question by bucket
//! weight and position.

pub mod board;
pub mod compact;
pub mod config;
pub mod drag;
pub mod error;
pub mod notify;
pub mod rank;
pub mod report;
pub mod snapshot;
pub mod starter;
pub mod types;

pub use board::{Board, BoardBuilder};
pub use compact::CompactState;
pub use drag::{can_accept, ContainerId, DragHooks, MoveCommit, MoveOutcome, MoveProposal};
pub use error::{RankboardError, Result};
pub use notify::{BoardState, StateShape};
pub use types::model::{Bucket, Item, Placement, Question, Scale, ScaleBucket, UNSORTED_LABEL};
pub use types::record::{decode_entries, DecodedEntries, RestoreReport, ResultRecord, SkipReason};
