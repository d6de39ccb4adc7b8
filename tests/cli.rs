//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;

use collate::adapters::memory::MemoryBoard;
use collate::config::{BoardConfig, BoardFailurePolicy, CollateConfig};
use collate::context::ServiceContext;
use collate::rollup::ApplyMode;
use collate::scheduler::Scheduler;

fn run_collate(args: &[&str], envs: &[(&str, &Path)]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_collate");
    let mut command = Command::new(bin);
    command
        .args(args)
        .env_remove("COLLATE_RECORD")
        .env_remove("COLLATE_REPLAY")
        .env_remove("TRELLO_APP_KEY")
        .env_remove("TRELLO_TOKEN");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("failed to run collate binary")
}

/// Writes a config file and a cassette of one pass over a seeded board.
fn fixture(dir: &Path, mode: ApplyMode) -> (PathBuf, PathBuf) {
    fixture_with(dir, mode, &[], BoardFailurePolicy::AbortPass)
}

/// Like [`fixture`], with extra board ids that do not exist listed first.
fn fixture_with(
    dir: &Path,
    mode: ApplyMode,
    missing_boards: &[&str],
    on_board_error: BoardFailurePolicy,
) -> (PathBuf, PathBuf) {
    std::fs::create_dir_all(dir).unwrap();
    let board = MemoryBoard::new();
    let board_id = board.add_board("Platform");
    let buckets = board.add_list(&board_id, "Work Buckets");
    board.add_card(&buckets, "Infra");
    let todo = board.add_list(&board_id, "To Do");
    board.add_card(&todo, "[infra] Rotate keys");

    let mut boards: Vec<BoardConfig> = missing_boards
        .iter()
        .map(|id| BoardConfig { id: (*id).to_string(), name: None })
        .collect();
    boards.push(BoardConfig { id: board_id, name: Some("Platform".into()) });
    let config = CollateConfig { boards, columns: vec!["To Do".into()], on_board_error };
    let config_path = dir.join("config.yaml");
    std::fs::write(&config_path, serde_yaml::to_string(&config).unwrap()).unwrap();

    let cassette_path = dir.join("pass.cassette.yaml");
    let ctx = ServiceContext::recording_with(Box::new(board), &cassette_path);
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    runtime.block_on(
        Scheduler::new(ctx.board.as_ref(), ctx.clock.as_ref(), config)
            .with_mode(mode)
            .collect_pass(),
    );
    drop(ctx);

    (config_path, cassette_path)
}

#[test]
fn help_lists_subcommands() {
    let output = run_collate(&["--help"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("run"));
    assert!(stdout.contains("plan"));
}

#[test]
fn run_help_shows_period_and_once() {
    let output = run_collate(&["run", "--help"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--period"));
    assert!(stdout.contains("--once"));
}

#[test]
fn version_exits_successfully() {
    let output = run_collate(&["--version"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("collate"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = run_collate(&["nonsense"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn invalid_period_exits_with_error() {
    let output = run_collate(&["run", "--period", "often"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("invalid duration"));
}

#[test]
fn missing_config_exits_with_error() {
    let output = run_collate(&["run", "--once", "--config", "/nonexistent/config.yaml"], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("failed to read /nonexistent/config.yaml"));
}

#[test]
fn missing_credentials_exit_with_error() {
    let dir = std::env::temp_dir().join("collate_cli_missing_auth");
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("config.yaml");
    std::fs::write(&config_path, "boards: []\ncolumns: []\n").unwrap();
    let auth_path = dir.join("auth.yaml");
    std::fs::write(&auth_path, "appkey: key\n").unwrap();

    let output = run_collate(
        &[
            "run",
            "--once",
            "--config",
            config_path.to_str().unwrap(),
            "--auth",
            auth_path.to_str().unwrap(),
        ],
        &[],
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("TRELLO_TOKEN"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plan_prints_pending_changes_from_replay() {
    let dir = std::env::temp_dir().join("collate_cli_plan_replay");
    let (config_path, cassette_path) = fixture(&dir, ApplyMode::DryRun);

    let output = run_collate(
        &["plan", "--config", config_path.to_str().unwrap()],
        &[("COLLATE_REPLAY", cassette_path.as_path())],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Platform: 1 rollup cards"));
    assert!(stdout.contains("CREATE Infra / Open Cards"));
    assert!(stdout.contains("ADD Infra / Open Cards: https://trello.test/c/"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_once_succeeds_from_replay() {
    let dir = std::env::temp_dir().join("collate_cli_run_replay");
    let (config_path, cassette_path) = fixture(&dir, ApplyMode::Apply);

    let output = run_collate(
        &["run", "--once", "--config", config_path.to_str().unwrap()],
        &[("COLLATE_REPLAY", cassette_path.as_path())],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn looping_run_refuses_cassettes() {
    let dir = std::env::temp_dir().join("collate_cli_loop_replay");
    let (config_path, cassette_path) = fixture(&dir, ApplyMode::Apply);

    for var in ["COLLATE_REPLAY", "COLLATE_RECORD"] {
        let output = run_collate(
            &["run", "--config", config_path.to_str().unwrap()],
            &[(var, cassette_path.as_path())],
        );
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!output.status.success());
        assert!(stderr.contains(var));
        assert!(stderr.contains("--once"));
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plan_prints_healthy_boards_when_another_fails() {
    let dir = std::env::temp_dir().join("collate_cli_plan_partial");
    let (config_path, cassette_path) =
        fixture_with(&dir, ApplyMode::DryRun, &["gone"], BoardFailurePolicy::Continue);

    let output = run_collate(
        &["plan", "--config", config_path.to_str().unwrap()],
        &[("COLLATE_REPLAY", cassette_path.as_path())],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stdout.contains("ADD Infra / Open Cards"));
    assert!(stderr.contains("failed to fetch board gone"));

    let _ = std::fs::remove_dir_all(&dir);
}
