//! Recording adapter for the `BoardService` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{Board, BoardFuture, BoardService, Card, CheckItem, Checklist, List};

const PORT: &str = "board";

/// Records board interactions while delegating to an inner implementation.
pub struct RecordingBoard {
    inner: Box<dyn BoardService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingBoard {
    /// Creates a recording board service wrapping the given implementation.
    pub fn new(inner: Box<dyn BoardService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct BoardInput<'a> {
    board_id: &'a str,
}

#[derive(Serialize)]
struct ListInput<'a> {
    list_id: &'a str,
}

#[derive(Serialize)]
struct CardInput<'a> {
    card_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct ChecklistInput<'a> {
    checklist_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<&'a str>,
}

impl BoardService for RecordingBoard {
    fn fetch_board<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Board> {
        Box::pin(async move {
            let result = self.inner.fetch_board(board_id).await;
            record_result(&self.recorder, PORT, "fetch_board", &BoardInput { board_id }, &result);
            result
        })
    }

    fn fetch_lists<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Vec<List>> {
        Box::pin(async move {
            let result = self.inner.fetch_lists(board_id).await;
            record_result(&self.recorder, PORT, "fetch_lists", &BoardInput { board_id }, &result);
            result
        })
    }

    fn fetch_cards<'a>(&'a self, list_id: &'a str) -> BoardFuture<'a, Vec<Card>> {
        Box::pin(async move {
            let result = self.inner.fetch_cards(list_id).await;
            record_result(&self.recorder, PORT, "fetch_cards", &ListInput { list_id }, &result);
            result
        })
    }

    fn fetch_checklists<'a>(&'a self, card_id: &'a str) -> BoardFuture<'a, Vec<Checklist>> {
        Box::pin(async move {
            let result = self.inner.fetch_checklists(card_id).await;
            let input = CardInput { card_id, name: None };
            record_result(&self.recorder, PORT, "fetch_checklists", &input, &result);
            result
        })
    }

    fn create_checklist<'a>(
        &'a self,
        card_id: &'a str,
        name: &'a str,
    ) -> BoardFuture<'a, Checklist> {
        Box::pin(async move {
            let result = self.inner.create_checklist(card_id, name).await;
            let input = CardInput { card_id, name: Some(name) };
            record_result(&self.recorder, PORT, "create_checklist", &input, &result);
            result
        })
    }

    fn create_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        label: &'a str,
    ) -> BoardFuture<'a, CheckItem> {
        Box::pin(async move {
            let result = self.inner.create_check_item(checklist_id, label).await;
            let input = ChecklistInput { checklist_id, label: Some(label), item_id: None };
            record_result(&self.recorder, PORT, "create_check_item", &input, &result);
            result
        })
    }

    fn delete_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        item_id: &'a str,
    ) -> BoardFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.delete_check_item(checklist_id, item_id).await;
            let input = ChecklistInput { checklist_id, label: None, item_id: Some(item_id) };
            record_result(&self.recorder, PORT, "delete_check_item", &input, &result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBoard;

    #[tokio::test]
    async fn records_reads_and_failures() {
        let dir = std::env::temp_dir().join("collate_rec_board_test");
        let cassette_path = dir.join("board.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "test")));

        let memory = MemoryBoard::new();
        let board_id = memory.add_board("Team");
        memory.add_list(&board_id, "Work Buckets");
        let board = RecordingBoard::new(Box::new(memory), Arc::clone(&recorder));

        let lists = board.fetch_lists(&board_id).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert!(board.fetch_board("missing").await.is_err());

        recorder.lock().unwrap().finish().unwrap();
        let content = std::fs::read_to_string(&cassette_path).unwrap();
        assert!(content.contains("fetch_lists"));
        assert!(content.contains("Work Buckets"));
        assert!(content.contains("board not found"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
