//! One reconciliation pass over one board.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use tracing::{debug, info};

use super::buckets::{self, Buckets, RollupCards};
use super::checklist::{self, ChecklistPlan, ChecklistTarget};
use super::tags::TagExtractor;
use super::{
    RollupError, FALLBACK_BUCKET, OPEN_CARDS_CHECKLIST, UNKNOWN_BUCKETS_CHECKLIST,
    WORK_BUCKETS_LIST,
};
use crate::ports::{Board, BoardService, Card, List};

/// Whether checklist plans are sent to the service or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Send every planned mutation.
    #[default]
    Apply,
    /// Compute plans without mutating anything.
    DryRun,
}

/// Outcome for a single rollup checklist.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistReport {
    /// Title of the rollup card.
    pub card: String,
    /// The plan that was applied (or would be, in a dry run).
    pub plan: ChecklistPlan,
}

/// Outcome of processing one board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardReport {
    /// Board display name.
    pub board: String,
    /// Number of rollup cards found in "Work Buckets".
    pub rollup_cards: usize,
    /// Buckets computed for this pass.
    pub buckets: Buckets,
    /// Every checklist that was reconciled, in processing order.
    pub checklists: Vec<ChecklistReport>,
}

impl BoardReport {
    /// Total number of mutations across all checklists.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.checklists.iter().map(|report| report.plan.mutation_count()).sum()
    }
}

/// Reconciles the rollup cards of a board with the cards of its source
/// columns.
///
/// Holds no state between calls: every pass re-reads the board.
pub struct BoardProcessor<'a> {
    service: &'a dyn BoardService,
    extractor: TagExtractor,
    columns: Vec<String>,
    mode: ApplyMode,
}

impl<'a> BoardProcessor<'a> {
    /// Creates a processor scanning `columns`, in order, for tagged cards.
    #[must_use]
    pub fn new(service: &'a dyn BoardService, columns: Vec<String>) -> Self {
        Self { service, extractor: TagExtractor::new(), columns, mode: ApplyMode::Apply }
    }

    /// Sets whether plans are applied or only reported.
    #[must_use]
    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Runs one pass over `board`.
    ///
    /// A board without a "Work Buckets" list has no rollup targets; its
    /// columns are still classified but nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or reconciliation error; later checklists of
    /// the board are not attempted.
    pub async fn process_board(&self, board: &Board) -> Result<BoardReport, RollupError> {
        let lists = self.index_lists(board).await?;
        let rollups = self.rollup_cards(&lists).await?;
        let buckets =
            buckets::classify(self.service, &self.extractor, &lists, &self.columns, &rollups)
                .await?;
        info!(
            board = %board.name,
            rollup_cards = rollups.len(),
            buckets = buckets.len(),
            "classified cards"
        );

        let mut checklists = Vec::new();
        for (key, card) in rollups.iter() {
            let desired: BTreeSet<String> =
                buckets.members(key).iter().map(|member| member.url.clone()).collect();
            let plan = self.sync_checklist(card, OPEN_CARDS_CHECKLIST, &desired).await?;
            checklists.push(ChecklistReport { card: card.title.clone(), plan });
        }

        if let Some(fallback) = rollups.get(FALLBACK_BUCKET) {
            let unknown = buckets.unknown(&rollups);
            if !unknown.is_empty() {
                debug!(board = %board.name, ?unknown, "buckets without rollup cards");
            }
            let plan = self.sync_checklist(fallback, UNKNOWN_BUCKETS_CHECKLIST, &unknown).await?;
            checklists.push(ChecklistReport { card: fallback.title.clone(), plan });
        }

        Ok(BoardReport {
            board: board.name.clone(),
            rollup_cards: rollups.len(),
            buckets,
            checklists,
        })
    }

    async fn index_lists(&self, board: &Board) -> Result<HashMap<String, List>, RollupError> {
        let lists = self
            .service
            .fetch_lists(&board.id)
            .await
            .map_err(|source| RollupError::FetchLists { board_id: board.id.clone(), source })?;
        Ok(lists.into_iter().map(|list| (list.name.to_lowercase(), list)).collect())
    }

    async fn rollup_cards(
        &self,
        lists: &HashMap<String, List>,
    ) -> Result<RollupCards, RollupError> {
        let Some(list) = lists.get(&WORK_BUCKETS_LIST.to_lowercase()) else {
            debug!("board has no {WORK_BUCKETS_LIST:?} list");
            return Ok(RollupCards::default());
        };
        let cards = self
            .service
            .fetch_cards(&list.id)
            .await
            .map_err(|source| RollupError::FetchCards { list: list.name.clone(), source })?;
        Ok(RollupCards::from_cards(cards))
    }

    async fn sync_checklist(
        &self,
        card: &Card,
        name: &str,
        desired: &BTreeSet<String>,
    ) -> Result<ChecklistPlan, RollupError> {
        match self.mode {
            ApplyMode::Apply => checklist::reconcile(self.service, card, name, desired).await,
            ApplyMode::DryRun => checklist::plan_for_card(self.service, card, name, desired).await,
        }
    }
}

/// Formats a board report as a human-readable summary.
#[must_use]
pub fn format_report(report: &BoardReport) -> String {
    let mut out = format!(
        "{}: {} rollup cards, {} buckets",
        report.board,
        report.rollup_cards,
        report.buckets.len()
    );
    if report.checklists.is_empty() {
        out.push_str("\n  no rollup checklists");
        return out;
    }
    for ChecklistReport { card, plan } in &report.checklists {
        let checklist = plan.target.name();
        if plan.is_noop() {
            let _ = write!(out, "\n  UNCHANGED {card} / {checklist}");
            continue;
        }
        if matches!(plan.target, ChecklistTarget::Missing { .. }) {
            let _ = write!(out, "\n  CREATE {card} / {checklist}");
        }
        for item in &plan.delete {
            let _ = write!(out, "\n  REMOVE {card} / {checklist}: {}", item.label);
        }
        for label in &plan.create {
            let _ = write!(out, "\n  ADD {card} / {checklist}: {label}");
        }
    }
    out
}
