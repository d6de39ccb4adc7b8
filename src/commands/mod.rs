//! Command dispatch and handlers.

pub mod plan;
pub mod run;

use std::env;
use std::future::Future;
use std::path::Path;

use tracing::{info, warn};

use crate::cli::{Command, CommonArgs};
use crate::config::{AuthConfig, CollateConfig};
use crate::context::ServiceContext;
use crate::logging;

/// Records every board interaction to the cassette at this path.
pub const RECORD_ENV: &str = "COLLATE_RECORD";

/// Serves board interactions from the cassette at this path instead of Trello.
pub const REPLAY_ENV: &str = "COLLATE_REPLAY";

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run { common, period, once } => run::run(common, *period, *once),
        Command::Plan { common } => plan::run(common),
    }
}

/// Cassette paths requested through the environment.
#[derive(Debug, Default)]
struct CassetteEnv {
    record: Option<String>,
    replay: Option<String>,
}

impl CassetteEnv {
    fn from_env() -> Self {
        Self { record: env::var(RECORD_ENV).ok(), replay: env::var(REPLAY_ENV).ok() }
    }

    /// Cassettes cover exactly one pass: a recording is only written when the
    /// run ends, and a replay runs out after the pass it recorded.
    fn check(&self, single_pass: bool) -> Result<(), String> {
        if single_pass {
            return Ok(());
        }
        let var = match (&self.record, &self.replay) {
            (Some(_), _) => RECORD_ENV,
            (None, Some(_)) => REPLAY_ENV,
            (None, None) => return Ok(()),
        };
        Err(format!("{var} needs a single pass: use `collate run --once` or `collate plan`"))
    }
}

/// Sets up logging, then loads the config and opens a service context.
fn prepare(
    common: &CommonArgs,
    single_pass: bool,
) -> Result<(CollateConfig, ServiceContext), String> {
    logging::init_logging(common.log_level());
    let cassettes = CassetteEnv::from_env();
    cassettes.check(single_pass)?;
    let config = CollateConfig::load(&common.config).map_err(|e| e.to_string())?;
    if config.boards.is_empty() {
        warn!(config = %common.config.display(), "no boards configured");
    }
    let ctx = open_context(&common.auth, cassettes)?;
    Ok((config, ctx))
}

/// Picks the adapters from `COLLATE_REPLAY` and `COLLATE_RECORD`.
///
/// Credentials are only loaded when Trello will actually be called.
fn open_context(auth_path: &Path, cassettes: CassetteEnv) -> Result<ServiceContext, String> {
    if let Some(path) = cassettes.replay {
        info!(cassette = %path, "replaying board interactions");
        return ServiceContext::replaying(Path::new(&path));
    }
    let auth = AuthConfig::load(auth_path).map_err(|e| e.to_string())?;
    match cassettes.record {
        Some(path) => {
            info!(cassette = %path, "recording board interactions");
            Ok(ServiceContext::recording(auth, Path::new(&path)))
        }
        None => Ok(ServiceContext::live(auth)),
    }
}

/// Drives `future` to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_on_runs_future() {
        assert_eq!(block_on(async { 40 + 2 }).unwrap(), 42);
    }

    #[test]
    fn prepare_reports_missing_config() {
        let common = CommonArgs {
            config: "/nonexistent/config.yaml".into(),
            auth: "/nonexistent/auth.yaml".into(),
            verbose: false,
        };
        let err = prepare(&common, true).err().unwrap();
        assert!(err.contains("/nonexistent/config.yaml"));
    }

    #[test]
    fn cassettes_require_a_single_pass() {
        let record = CassetteEnv { record: Some("pass.yaml".into()), replay: None };
        assert!(record.check(false).unwrap_err().contains(RECORD_ENV));
        assert!(record.check(true).is_ok());

        let replay = CassetteEnv { record: None, replay: Some("pass.yaml".into()) };
        assert!(replay.check(false).unwrap_err().contains(REPLAY_ENV));
        assert!(replay.check(true).is_ok());

        assert!(CassetteEnv::default().check(false).is_ok());
    }

    #[test]
    fn replay_context_skips_credentials() {
        let cassettes = CassetteEnv { record: None, replay: Some("/nonexistent/pass.yaml".into()) };
        let err = open_context(Path::new("/nonexistent/auth.yaml"), cassettes).err().unwrap();
        assert!(err.contains("cassette"));
    }
}
