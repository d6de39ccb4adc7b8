//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `collate`.
#[derive(Debug, Parser)]
#[command(name = "collate", version, about = "Mirror tagged Trello cards onto rollup checklists")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile every configured board, once or periodically.
    Run {
        /// Config and credential locations.
        #[command(flatten)]
        common: CommonArgs,
        /// Time between pass starts, e.g. `90s`, `30m`, `1h30m`.
        #[arg(long, default_value = "30m", value_parser = parse_period)]
        period: Duration,
        /// Run a single pass and exit.
        #[arg(long)]
        once: bool,
    },
    /// Show the checklist changes one pass would make, without making them.
    Plan {
        /// Config and credential locations.
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Arguments shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Boards and columns to collate.
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,
    /// Trello `appkey` and `token`.
    #[arg(long, default_value = "auth.yaml")]
    pub auth: PathBuf,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Default log filter for these arguments.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Parses a duration written as a sequence of `<number><unit>` terms,
/// such as `45s`, `1h30m` or `1.5h`. Units are `ms`, `s`, `m` and `h`.
///
/// # Errors
///
/// Returns a message for empty or malformed input and for a zero duration.
pub fn parse_period(input: &str) -> Result<Duration, String> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut millis = 0.0_f64;
    while !rest.is_empty() {
        let number_len =
            rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}: expected a number"));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}: bad number"))?;
        rest = &rest[number_len..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "" => return Err(format!("invalid duration {input:?}: missing unit")),
            unit => return Err(format!("invalid duration {input:?}: unknown unit {unit:?}")),
        };
        rest = &rest[unit_len..];
        millis += value * scale;
    }

    if millis <= 0.0 {
        return Err(format!("invalid duration {input:?}: must be greater than zero"));
    }
    Ok(Duration::from_secs_f64(millis / 1_000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::parse_from(["collate", "run"]);
        let Command::Run { common, period, once } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(common.config, PathBuf::from("config.yaml"));
        assert_eq!(common.auth, PathBuf::from("auth.yaml"));
        assert_eq!(period, Duration::from_secs(30 * 60));
        assert!(!once);
        assert_eq!(common.log_level(), "info");
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "collate", "run", "--config", "boards.yaml", "--period", "90s", "--once", "-v",
        ]);
        let Command::Run { common, period, once } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(common.config, PathBuf::from("boards.yaml"));
        assert_eq!(period, Duration::from_secs(90));
        assert!(once);
        assert_eq!(common.log_level(), "debug");
    }

    #[test]
    fn parses_plan_subcommand() {
        let cli = Cli::parse_from(["collate", "plan", "--auth", "creds.yaml"]);
        let Command::Plan { common } = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(common.auth, PathBuf::from("creds.yaml"));
    }

    #[test]
    fn rejects_bad_period() {
        assert!(Cli::try_parse_from(["collate", "run", "--period", "soon"]).is_err());
    }

    #[test]
    fn period_accepts_compound_terms() {
        assert_eq!(parse_period("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_period("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_period("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn period_rejects_malformed_input() {
        assert!(parse_period("").is_err());
        assert!(parse_period("30").unwrap_err().contains("missing unit"));
        assert!(parse_period("5d").unwrap_err().contains("unknown unit"));
        assert!(parse_period("m5").is_err());
        assert!(parse_period("0s").unwrap_err().contains("greater than zero"));
    }
}
