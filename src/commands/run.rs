//! `collate run` command.

use std::time::Duration;

use tracing::info;

use crate::cli::CommonArgs;
use crate::scheduler::Scheduler;

/// Execute the `run` command.
///
/// Loops forever unless `once` is set.
///
/// # Errors
///
/// Returns an error string if configuration cannot be loaded, or if the
/// single pass of a `once` run fails.
pub fn run(common: &CommonArgs, period: Duration, once: bool) -> Result<(), String> {
    let (config, ctx) = super::prepare(common, once)?;
    info!(boards = config.boards.len(), period_secs = period.as_secs(), once, "starting");

    let scheduler = Scheduler::new(ctx.board.as_ref(), ctx.clock.as_ref(), config)
        .with_period(period)
        .once(once);
    let outcome = super::block_on(scheduler.run())?;
    outcome.map_err(|e| e.to_string())
}
