//! Rollup reconciliation core.
//!
//! One pass over a board extracts `[tag]` markers from card titles, groups
//! the cards of the configured columns into buckets, and mirrors every
//! bucket onto the checklist of its rollup card in the "Work Buckets" list.

pub mod board;
pub mod buckets;
pub mod checklist;
pub mod tags;

use thiserror::Error;

use crate::ports::BoardError;

pub use board::{ApplyMode, BoardProcessor, BoardReport, ChecklistReport};
pub use buckets::{Buckets, RollupCards};
pub use checklist::{ChecklistPlan, ChecklistTarget};
pub use tags::TagExtractor;

/// Name of the list holding rollup cards. Matched case-insensitively.
pub const WORK_BUCKETS_LIST: &str = "Work Buckets";

/// Checklist on each rollup card that mirrors the bucket's member cards.
pub const OPEN_CARDS_CHECKLIST: &str = "Open Cards";

/// Checklist on the fallback rollup card listing buckets without a rollup card.
pub const UNKNOWN_BUCKETS_CHECKLIST: &str = "Unknown Buckets";

/// Bucket key for cards with no tag that matches a rollup card.
pub const FALLBACK_BUCKET: &str = "none";

/// Errors raised while reconciling a board.
///
/// Each variant names the remote operation that failed and the entity it
/// targeted; the service error is kept verbatim as the source.
#[derive(Debug, Error)]
pub enum RollupError {
    /// The board itself could not be fetched.
    #[error("failed to fetch board {board_id}: {source}")]
    FetchBoard {
        /// Board identifier.
        board_id: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// The lists of a board could not be fetched.
    #[error("failed to fetch lists of board {board_id}: {source}")]
    FetchLists {
        /// Board identifier.
        board_id: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// The cards of a list could not be fetched.
    #[error("failed to fetch cards of list {list:?}: {source}")]
    FetchCards {
        /// List name.
        list: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// The checklists of a card could not be fetched.
    #[error("failed to fetch checklists of card {card:?}: {source}")]
    FetchChecklists {
        /// Card title.
        card: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// A missing checklist could not be created.
    #[error("failed to create checklist {name:?} on card {card:?}: {source}")]
    CreateChecklist {
        /// Card title.
        card: String,
        /// Checklist name.
        name: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// A checklist item could not be created.
    #[error("failed to add {label:?} to checklist {checklist:?}: {source}")]
    CreateCheckItem {
        /// Checklist name.
        checklist: String,
        /// Item label.
        label: String,
        /// Underlying service error.
        source: BoardError,
    },

    /// A checklist item could not be deleted.
    #[error("failed to remove {label:?} from checklist {checklist:?}: {source}")]
    DeleteCheckItem {
        /// Checklist name.
        checklist: String,
        /// Item label.
        label: String,
        /// Underlying service error.
        source: BoardError,
    },
}
