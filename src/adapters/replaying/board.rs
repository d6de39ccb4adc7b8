//! Replaying adapter for the `BoardService` port.

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Board, BoardError, BoardFuture, BoardService, Card, CheckItem, Checklist, List};

const PORT: &str = "board";

/// Serves recorded board interactions from a cassette.
///
/// Arguments are not compared with the recording; calls are answered in the
/// order they were recorded, per method.
pub struct ReplayingBoard {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingBoard {
    /// Creates a replaying board service from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn next<T: DeserializeOwned>(&self, method: &str) -> Result<T, BoardError> {
        let output = {
            let mut replayer = self.replayer.lock().expect("replayer lock poisoned");
            replayer.next_interaction(PORT, method).output.clone()
        };
        replay_result(output, &format!("{PORT}::{method}"))
    }
}

impl BoardService for ReplayingBoard {
    fn fetch_board<'a>(&'a self, _board_id: &'a str) -> BoardFuture<'a, Board> {
        let result = self.next("fetch_board");
        Box::pin(async move { result })
    }

    fn fetch_lists<'a>(&'a self, _board_id: &'a str) -> BoardFuture<'a, Vec<List>> {
        let result = self.next("fetch_lists");
        Box::pin(async move { result })
    }

    fn fetch_cards<'a>(&'a self, _list_id: &'a str) -> BoardFuture<'a, Vec<Card>> {
        let result = self.next("fetch_cards");
        Box::pin(async move { result })
    }

    fn fetch_checklists<'a>(&'a self, _card_id: &'a str) -> BoardFuture<'a, Vec<Checklist>> {
        let result = self.next("fetch_checklists");
        Box::pin(async move { result })
    }

    fn create_checklist<'a>(
        &'a self,
        _card_id: &'a str,
        _name: &'a str,
    ) -> BoardFuture<'a, Checklist> {
        let result = self.next("create_checklist");
        Box::pin(async move { result })
    }

    fn create_check_item<'a>(
        &'a self,
        _checklist_id: &'a str,
        _label: &'a str,
    ) -> BoardFuture<'a, CheckItem> {
        let result = self.next("create_check_item");
        Box::pin(async move { result })
    }

    fn delete_check_item<'a>(
        &'a self,
        _checklist_id: &'a str,
        _item_id: &'a str,
    ) -> BoardFuture<'a, ()> {
        let result = self.next("delete_check_item");
        Box::pin(async move { result })
    }
}
