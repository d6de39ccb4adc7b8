//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the reconciliation core and an
//! external system (the remote task board, time). Implementations live in
//! `src/adapters/`.

pub mod board;
pub mod clock;

pub use board::{
    Board, BoardError, BoardFuture, BoardService, Card, CheckItem, Checklist, List,
};
pub use clock::Clock;
