//! Periodic passes over the configured boards.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::{BoardConfig, BoardFailurePolicy, CollateConfig};
use crate::ports::{BoardService, Clock};
use crate::rollup::{ApplyMode, BoardProcessor, BoardReport, RollupError};

/// Default time between pass starts.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30 * 60);

/// Reports and failures of one pass, in board order.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Boards processed successfully.
    pub reports: Vec<BoardReport>,
    /// Board failures. Holds at most one under [`BoardFailurePolicy::AbortPass`].
    pub errors: Vec<RollupError>,
}

impl PassOutcome {
    /// The reports, or the first failure if any board failed.
    ///
    /// # Errors
    ///
    /// Returns the first board error of the pass.
    pub fn into_result(self) -> Result<Vec<BoardReport>, RollupError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.reports),
        }
    }
}

/// Drives [`BoardProcessor`] over every configured board, once or forever.
pub struct Scheduler<'a> {
    service: &'a dyn BoardService,
    clock: &'a dyn Clock,
    config: CollateConfig,
    period: Duration,
    once: bool,
    mode: ApplyMode,
}

impl<'a> Scheduler<'a> {
    /// Creates a scheduler that applies changes every [`DEFAULT_PERIOD`].
    #[must_use]
    pub fn new(
        service: &'a dyn BoardService,
        clock: &'a dyn Clock,
        config: CollateConfig,
    ) -> Self {
        Self {
            service,
            clock,
            config,
            period: DEFAULT_PERIOD,
            once: false,
            mode: ApplyMode::Apply,
        }
    }

    /// Sets the time between pass starts.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Runs a single pass instead of looping.
    #[must_use]
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Sets whether checklist changes are applied or only planned.
    #[must_use]
    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Processes every configured board in order.
    ///
    /// # Errors
    ///
    /// With [`BoardFailurePolicy::AbortPass`] the first board error ends the
    /// pass and is returned. With [`BoardFailurePolicy::Continue`] every
    /// board is attempted and the first error is returned afterwards.
    pub async fn run_pass(&self) -> Result<Vec<BoardReport>, RollupError> {
        self.collect_pass().await.into_result()
    }

    /// Processes every configured board in order, keeping the reports of the
    /// boards that succeeded alongside the failures.
    pub async fn collect_pass(&self) -> PassOutcome {
        let processor = BoardProcessor::new(self.service, self.config.columns.clone())
            .with_mode(self.mode);
        let mut outcome = PassOutcome::default();

        for board in &self.config.boards {
            match self.process(&processor, board).await {
                Ok(report) => {
                    info!(
                        board = %report.board,
                        checklists = report.checklists.len(),
                        mutations = report.mutation_count(),
                        "board reconciled"
                    );
                    outcome.reports.push(report);
                }
                Err(e) => {
                    warn!(board = board.label(), "board failed: {e}");
                    outcome.errors.push(e);
                    if self.config.on_board_error == BoardFailurePolicy::AbortPass {
                        break;
                    }
                }
            }
        }
        outcome
    }

    async fn process(
        &self,
        processor: &BoardProcessor<'_>,
        config: &BoardConfig,
    ) -> Result<BoardReport, RollupError> {
        let board = self
            .service
            .fetch_board(&config.id)
            .await
            .map_err(|source| RollupError::FetchBoard { board_id: config.id.clone(), source })?;
        processor.process_board(&board).await
    }

    /// Runs passes until one fails in `once` mode, or forever otherwise.
    ///
    /// Passes start `period` apart; a pass that overruns the period is
    /// followed immediately by the next one.
    ///
    /// # Errors
    ///
    /// In `once` mode, returns the error of the single pass. A looping
    /// scheduler logs failed passes and keeps going.
    pub async fn run(&self) -> Result<(), RollupError> {
        loop {
            let started = self.clock.now();
            let result = self.run_pass().await;
            if self.once {
                return result.map(|_| ());
            }
            if let Err(e) = result {
                error!("pass failed: {e}");
            }

            let wait = sleep_duration(self.period, started, self.clock.now());
            info!(seconds = wait.as_secs(), "waiting for next pass");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Time left in the period that began at `started`, or zero if it is over.
#[must_use]
pub fn sleep_duration(period: Duration, started: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let elapsed = (now - started).to_std().unwrap_or(Duration::ZERO);
    period.saturating_sub(elapsed)
}
