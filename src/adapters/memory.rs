//! In-memory adapter for the `BoardService` port.
//!
//! Holds a whole board hierarchy behind a mutex and serves it through the
//! same trait as the live adapter. Tests seed it with the `add_*` helpers and
//! inspect it with [`MemoryBoard::labels`] and [`MemoryBoard::mutation_count`].

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use crate::ports::{Board, BoardError, BoardFuture, BoardService, Card, CheckItem, Checklist, List};

/// Failure injection for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Every fetch fails.
    Reads,
    /// Mutations succeed this many more times, then fail.
    AfterMutations(usize),
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    boards: Vec<Board>,
    lists: Vec<List>,
    cards: Vec<Card>,
    checklists: Vec<Checklist>,
    mutations: usize,
    failure: Option<Failure>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn insert_checklist(&mut self, card_id: &str, name: &str) -> Checklist {
        let checklist = Checklist {
            id: self.next_id("checklist-"),
            name: name.to_string(),
            card_id: card_id.to_string(),
            items: Vec::new(),
        };
        self.checklists.push(checklist.clone());
        checklist
    }

    fn insert_item(&mut self, checklist_id: &str, label: &str) -> Result<CheckItem, BoardError> {
        let item = CheckItem {
            id: self.next_id("item-"),
            label: label.to_string(),
            checklist_id: checklist_id.to_string(),
            checked: false,
        };
        let checklist = self
            .checklists
            .iter_mut()
            .find(|c| c.id == checklist_id)
            .ok_or_else(|| format!("checklist not found: {checklist_id}"))?;
        checklist.items.push(item.clone());
        Ok(item)
    }
}

/// Board service backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryBoard {
    state: Mutex<State>,
}

impl MemoryBoard {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory board lock poisoned")
    }

    fn read<T>(
        &self,
        what: &str,
        f: impl FnOnce(&State) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let state = self.state();
        if state.failure == Some(Failure::Reads) {
            return Err(format!("injected read failure: {what}").into());
        }
        f(&state)
    }

    fn mutate<T>(
        &self,
        what: &str,
        f: impl FnOnce(&mut State) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let mut state = self.state();
        if let Some(Failure::AfterMutations(remaining)) = state.failure {
            if remaining == 0 {
                return Err(format!("injected mutation failure: {what}").into());
            }
            state.failure = Some(Failure::AfterMutations(remaining - 1));
        }
        let value = f(&mut state)?;
        state.mutations += 1;
        Ok(value)
    }

    /// Adds a board and returns its id.
    pub fn add_board(&self, name: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("board-");
        state.boards.push(Board { id: id.clone(), name: name.to_string() });
        id
    }

    /// Adds a list to a board and returns its id.
    pub fn add_list(&self, board_id: &str, name: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("list-");
        let list = List { id: id.clone(), name: name.to_string(), board_id: board_id.to_string() };
        state.lists.push(list);
        id
    }

    /// Appends a card to a list and returns it.
    pub fn add_card(&self, list_id: &str, title: &str) -> Card {
        let mut state = self.state();
        let id = state.next_id("card-");
        let card = Card {
            url: format!("https://trello.test/c/{id}"),
            id,
            title: title.to_string(),
            list_id: list_id.to_string(),
        };
        state.cards.push(card.clone());
        card
    }

    /// Adds an empty checklist to a card without counting a mutation.
    pub fn add_checklist(&self, card_id: &str, name: &str) -> String {
        self.state().insert_checklist(card_id, name).id
    }

    /// Appends an item to a checklist without counting a mutation.
    ///
    /// # Panics
    ///
    /// Panics if the checklist does not exist.
    pub fn add_check_item(&self, checklist_id: &str, label: &str) -> String {
        self.state().insert_item(checklist_id, label).expect("seeded checklist exists").id
    }

    /// Changes a card's title.
    pub fn rename_card(&self, card_id: &str, title: &str) {
        if let Some(card) = self.state().cards.iter_mut().find(|c| c.id == card_id) {
            card.title = title.to_string();
        }
    }

    /// Returns the first card with exactly this title.
    #[must_use]
    pub fn card_by_title(&self, title: &str) -> Option<Card> {
        self.state().cards.iter().find(|c| c.title == title).cloned()
    }

    /// Item labels of the first checklist on `card_id` whose name matches
    /// `name` case-insensitively, or `None` if there is no such checklist.
    #[must_use]
    pub fn labels(&self, card_id: &str, name: &str) -> Option<BTreeSet<String>> {
        let wanted = name.to_lowercase();
        self.state()
            .checklists
            .iter()
            .find(|c| c.card_id == card_id && c.name.to_lowercase() == wanted)
            .map(|c| c.items.iter().map(|item| item.label.clone()).collect())
    }

    /// Number of items on a checklist, counting repeated labels.
    #[must_use]
    pub fn item_count(&self, checklist_id: &str) -> usize {
        self.state().checklists.iter().find(|c| c.id == checklist_id).map_or(0, |c| c.items.len())
    }

    /// Number of successful mutations served so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.state().mutations
    }

    /// Makes every fetch fail until [`MemoryBoard::clear_failure`].
    pub fn fail_reads(&self) {
        self.state().failure = Some(Failure::Reads);
    }

    /// Lets `count` more mutations succeed, then fails every later one.
    pub fn fail_after_mutations(&self, count: usize) {
        self.state().failure = Some(Failure::AfterMutations(count));
    }

    /// Removes any injected failure.
    pub fn clear_failure(&self) {
        self.state().failure = None;
    }
}

impl BoardService for MemoryBoard {
    fn fetch_board<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Board> {
        let result = self.read("fetch_board", |state| {
            state
                .boards
                .iter()
                .find(|b| b.id == board_id)
                .cloned()
                .ok_or_else(|| format!("board not found: {board_id}").into())
        });
        Box::pin(async move { result })
    }

    fn fetch_lists<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Vec<List>> {
        let result = self.read("fetch_lists", |state| {
            Ok(state.lists.iter().filter(|l| l.board_id == board_id).cloned().collect::<Vec<_>>())
        });
        Box::pin(async move { result })
    }

    fn fetch_cards<'a>(&'a self, list_id: &'a str) -> BoardFuture<'a, Vec<Card>> {
        let result = self.read("fetch_cards", |state| {
            Ok(state.cards.iter().filter(|c| c.list_id == list_id).cloned().collect::<Vec<_>>())
        });
        Box::pin(async move { result })
    }

    fn fetch_checklists<'a>(&'a self, card_id: &'a str) -> BoardFuture<'a, Vec<Checklist>> {
        let result = self.read("fetch_checklists", |state| {
            let checklists = state.checklists.iter().filter(|c| c.card_id == card_id);
            Ok(checklists.cloned().collect::<Vec<_>>())
        });
        Box::pin(async move { result })
    }

    fn create_checklist<'a>(
        &'a self,
        card_id: &'a str,
        name: &'a str,
    ) -> BoardFuture<'a, Checklist> {
        let result =
            self.mutate("create_checklist", |state| Ok(state.insert_checklist(card_id, name)));
        Box::pin(async move { result })
    }

    fn create_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        label: &'a str,
    ) -> BoardFuture<'a, CheckItem> {
        let result =
            self.mutate("create_check_item", |state| state.insert_item(checklist_id, label));
        Box::pin(async move { result })
    }

    fn delete_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        item_id: &'a str,
    ) -> BoardFuture<'a, ()> {
        let result = self.mutate("delete_check_item", |state| {
            let checklist = state
                .checklists
                .iter_mut()
                .find(|c| c.id == checklist_id)
                .ok_or_else(|| format!("checklist not found: {checklist_id}"))?;
            let before = checklist.items.len();
            checklist.items.retain(|item| item.id != item_id);
            if checklist.items.len() == before {
                return Err(format!("check item not found: {item_id}").into());
            }
            Ok(())
        });
        Box::pin(async move { result })
    }
}
