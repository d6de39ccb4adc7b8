//! Board service port for the remote task board (boards, lists, cards and
//! checklists).
//!
//! Entities are plain data. Sub-entities carry the identifier of their parent
//! instead of a handle back to the client, so every follow-up call goes
//! through an explicit [`BoardService`] reference.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Error returned by every [`BoardService`] call. Transport, auth and
/// decoding failures are passed through unclassified.
pub type BoardError = Box<dyn Error + Send + Sync>;

/// Boxed future type alias used by [`BoardService`] to keep the trait dyn-compatible.
pub type BoardFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BoardError>> + Send + 'a>>;

/// A board on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// The unique identifier for this board.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// The unique identifier for this list.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Identifier of the owning board.
    pub board_id: String,
}

/// A card inside a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// The unique identifier for this card.
    pub id: String,
    /// Card title; may contain `[tag]` markers.
    pub title: String,
    /// Stable link to the card, used as the checklist label that mirrors it.
    pub url: String,
    /// Identifier of the owning list.
    pub list_id: String,
}

/// A named checklist attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    /// The unique identifier for this checklist.
    pub id: String,
    /// Display name, matched case-insensitively during reconciliation.
    pub name: String,
    /// Identifier of the owning card.
    pub card_id: String,
    /// Items in the order the service returned them.
    #[serde(default)]
    pub items: Vec<CheckItem>,
}

/// A single item on a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    /// The unique identifier for this item.
    pub id: String,
    /// Display label. Reconciliation treats the label, not the id, as the
    /// item's identity within its checklist.
    pub label: String,
    /// Identifier of the owning checklist.
    pub checklist_id: String,
    /// Whether the item is ticked.
    #[serde(default)]
    pub checked: bool,
}

/// Reads and mutates boards on a remote task-board service.
///
/// Every call is a single round trip; implementations do not cache.
pub trait BoardService: Send + Sync {
    /// Fetches a board by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be fetched.
    fn fetch_board<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Board>;

    /// Fetches every open list on a board.
    ///
    /// # Errors
    ///
    /// Returns an error if the lists cannot be fetched.
    fn fetch_lists<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Vec<List>>;

    /// Fetches every open card in a list, in list order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cards cannot be fetched.
    fn fetch_cards<'a>(&'a self, list_id: &'a str) -> BoardFuture<'a, Vec<Card>>;

    /// Fetches every checklist on a card, including their items.
    ///
    /// # Errors
    ///
    /// Returns an error if the checklists cannot be fetched.
    fn fetch_checklists<'a>(&'a self, card_id: &'a str) -> BoardFuture<'a, Vec<Checklist>>;

    /// Creates an empty checklist named `name` on a card.
    ///
    /// # Errors
    ///
    /// Returns an error if the checklist cannot be created.
    fn create_checklist<'a>(&'a self, card_id: &'a str, name: &'a str)
        -> BoardFuture<'a, Checklist>;

    /// Appends an unchecked item labelled `label` to a checklist.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be created.
    fn create_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        label: &'a str,
    ) -> BoardFuture<'a, CheckItem>;

    /// Deletes an item from a checklist.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be deleted.
    fn delete_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        item_id: &'a str,
    ) -> BoardFuture<'a, ()>;
}
