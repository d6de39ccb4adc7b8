//! `collate plan` command.

use std::fmt::Write;

use crate::cli::CommonArgs;
use crate::rollup::board::format_report;
use crate::rollup::{ApplyMode, BoardReport};
use crate::scheduler::Scheduler;

/// Execute the `plan` command.
///
/// Runs one dry-run pass and prints the checklist changes it would make.
///
/// Boards that were planned are printed even when others failed.
///
/// # Errors
///
/// Returns an error string if configuration cannot be loaded or any board
/// fails.
pub fn run(common: &CommonArgs) -> Result<(), String> {
    let (config, ctx) = super::prepare(common, true)?;
    let scheduler = Scheduler::new(ctx.board.as_ref(), ctx.clock.as_ref(), config)
        .with_mode(ApplyMode::DryRun);
    let outcome = super::block_on(scheduler.collect_pass())?;
    if !outcome.reports.is_empty() || outcome.errors.is_empty() {
        println!("{}", render(&outcome.reports));
    }
    match outcome.errors.as_slice() {
        [] => Ok(()),
        [only] => Err(only.to_string()),
        [first, rest @ ..] => Err(format!("{first} (and {} more failed board(s))", rest.len())),
    }
}

fn render(reports: &[BoardReport]) -> String {
    if reports.is_empty() {
        return "No boards configured.".to_string();
    }
    let pending: usize = reports.iter().map(BoardReport::mutation_count).sum();
    let mut out = reports.iter().map(format_report).collect::<Vec<_>>().join("\n\n");
    let _ = write!(out, "\n\n{pending} change(s) pending.");
    out
}
