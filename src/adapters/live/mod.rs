//! Live adapters for real external interactions.

pub mod clock;
pub mod trello;

pub use clock::LiveClock;
pub use trello::{LiveTrello, TrelloError};
