//! Grouping of source-column cards into buckets.
//!
//! Keys are lower-cased tag text; display casing of tags and rollup titles
//! is not preserved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::tags::TagExtractor;
use super::{RollupError, FALLBACK_BUCKET};
use crate::ports::{BoardService, Card, List};

/// Rollup cards of one board, keyed by lower-cased title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollupCards {
    cards: BTreeMap<String, Card>,
}

impl RollupCards {
    /// Indexes the cards of the "Work Buckets" list. When two cards share a
    /// title the later one wins.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let cards = cards.into_iter().map(|card| (card.title.to_lowercase(), card)).collect();
        Self { cards }
    }

    /// Returns the rollup card for a bucket key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Card> {
        self.cards.get(key)
    }

    /// Whether a bucket key has a rollup card.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cards.contains_key(key)
    }

    /// Iterates over `(bucket key, rollup card)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Card)> {
        self.cards.iter().map(|(key, card)| (key.as_str(), card))
    }

    /// Number of rollup cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the board has no rollup cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Member cards of every bucket for one pass.
///
/// Members keep discovery order: configured column order first, then card
/// order within the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    members: BTreeMap<String, Vec<Card>>,
}

impl Buckets {
    /// Adds `card` to the bucket of every tag in `tags`, whether or not the
    /// tag has a rollup card. The card also lands in the fallback bucket
    /// unless at least one of its tags has a rollup card.
    pub fn assign(&mut self, card: &Card, tags: &BTreeSet<String>, rollups: &RollupCards) {
        let mut matched = false;
        for tag in tags {
            self.members.entry(tag.clone()).or_default().push(card.clone());
            matched |= rollups.contains(tag);
        }
        if !matched {
            self.members.entry(FALLBACK_BUCKET.to_string()).or_default().push(card.clone());
        }
    }

    /// Member cards of a bucket; empty when the bucket has none.
    #[must_use]
    pub fn members(&self, key: &str) -> &[Card] {
        self.members.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bucket keys that have at least one member, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Bucket keys with members but no rollup card.
    #[must_use]
    pub fn unknown(&self, rollups: &RollupCards) -> BTreeSet<String> {
        self.keys().filter(|key| !rollups.contains(key)).map(str::to_string).collect()
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no card was assigned to any bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Fetches the cards of every configured column and assigns them to buckets.
///
/// `lists` is the board's lists keyed by lower-cased name. Columns are looked
/// up case-insensitively, in configured order; a column missing from the
/// board is skipped.
///
/// # Errors
///
/// Returns an error if the cards of a column cannot be fetched.
pub async fn classify(
    service: &dyn BoardService,
    extractor: &TagExtractor,
    lists: &HashMap<String, List>,
    columns: &[String],
    rollups: &RollupCards,
) -> Result<Buckets, RollupError> {
    let mut buckets = Buckets::default();
    for column in columns {
        let Some(list) = lists.get(&column.to_lowercase()) else {
            debug!(column = %column, "column not on board, skipping");
            continue;
        };
        let cards = service
            .fetch_cards(&list.id)
            .await
            .map_err(|source| RollupError::FetchCards { list: list.name.clone(), source })?;
        debug!(column = %list.name, cards = cards.len(), "classifying column");
        for card in &cards {
            let tags = extractor.extract(&card.title);
            buckets.assign(card, &tags, rollups);
        }
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBoard;

    fn card(id: &str, title: &str) -> Card {
        Card {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("https://trello.test/c/{id}"),
            list_id: "list".to_string(),
        }
    }

    fn rollups(titles: &[&str]) -> RollupCards {
        RollupCards::from_cards(
            titles.iter().enumerate().map(|(i, t)| card(&format!("r{i}"), t)).collect(),
        )
    }

    fn assign_all(cards: &[Card], rollups: &RollupCards) -> Buckets {
        let extractor = TagExtractor::new();
        let mut buckets = Buckets::default();
        for c in cards {
            buckets.assign(c, &extractor.extract(&c.title), rollups);
        }
        buckets
    }

    fn ids(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn rollup_index_is_case_insensitive() {
        let index = rollups(&["Infra", "None"]);
        assert!(index.contains("infra"));
        assert!(index.contains(FALLBACK_BUCKET));
        assert!(!index.contains("Infra"));
    }

    #[test]
    fn multi_tag_card_fans_out() {
        let buckets = assign_all(&[card("a", "[foo][bar] Task")], &rollups(&["foo", "bar"]));
        assert_eq!(ids(buckets.members("foo")), vec!["a"]);
        assert_eq!(ids(buckets.members("bar")), vec!["a"]);
        assert!(buckets.members(FALLBACK_BUCKET).is_empty());
    }

    #[test]
    fn untagged_card_falls_back() {
        let buckets = assign_all(&[card("a", "Plain task")], &rollups(&["foo"]));
        assert_eq!(ids(buckets.members(FALLBACK_BUCKET)), vec!["a"]);
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn unmatched_tags_fall_back_but_still_form_buckets() {
        let buckets = assign_all(&[card("a", "[ghost] Task")], &rollups(&["foo"]));
        assert_eq!(ids(buckets.members(FALLBACK_BUCKET)), vec!["a"]);
        assert_eq!(ids(buckets.members("ghost")), vec!["a"]);
    }

    #[test]
    fn one_matching_tag_keeps_card_out_of_fallback() {
        let buckets = assign_all(&[card("a", "[foo][ghost] Task")], &rollups(&["foo"]));
        assert!(buckets.members(FALLBACK_BUCKET).is_empty());
        assert_eq!(ids(buckets.members("ghost")), vec!["a"]);
    }

    #[test]
    fn members_keep_discovery_order() {
        let cards = [card("a", "[foo] one"), card("b", "two"), card("c", "[FOO] three")];
        let buckets = assign_all(&cards, &rollups(&["foo"]));
        assert_eq!(ids(buckets.members("foo")), vec!["a", "c"]);
    }

    #[test]
    fn unknown_lists_buckets_without_rollup_cards() {
        let cards = [card("a", "[foo] one"), card("b", "[bar] two")];
        let index = rollups(&["foo", "none"]);
        let buckets = assign_all(&cards, &index);
        let unknown: Vec<String> = buckets.unknown(&index).into_iter().collect();
        assert_eq!(unknown, vec!["bar"]);
    }

    #[tokio::test]
    async fn classify_skips_missing_columns_and_matches_names_case_insensitively() {
        let board = MemoryBoard::new();
        let board_id = board.add_board("Team");
        let todo = board.add_list(&board_id, "To Do");
        let doing = board.add_list(&board_id, "Doing");
        board.add_card(&todo, "[foo] A");
        board.add_card(&doing, "B");

        let lists: HashMap<String, List> = board
            .fetch_lists(&board_id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| (l.name.to_lowercase(), l))
            .collect();
        let columns = vec!["to do".to_string(), "Missing".to_string()];
        let buckets =
            classify(&board, &TagExtractor::new(), &lists, &columns, &rollups(&["foo"]))
                .await
                .unwrap();

        assert_eq!(buckets.members("foo").len(), 1);
        assert!(buckets.members(FALLBACK_BUCKET).is_empty());
    }
}
