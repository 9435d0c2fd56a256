// tests/cli_run.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, logical};

use std::path::Path;

use lastfriday::chain::RunStatus;
use lastfriday::cli::CliArgs;
use lastfriday::history::HistoryStore;
use lastfriday_test_utils::with_timeout;

fn write_config(dir: &Path, last_cmd: &str, with_history: bool) -> String {
    let history = if with_history {
        format!("history = \"{}\"\n", dir.join("history.jsonl").display())
    } else {
        String::new()
    };
    let contents = format!(
        r#"
[pipeline]
name = "cli"
settle_delay = "0ms"
{history}
[default]
retries = 0
retry_delay = "1s"

[[stage]]
name = "download"
cmd = "touch {marker}"

[[stage]]
name = "load"
cmd = "{last_cmd}"
"#,
        marker = dir.join("downloaded").display(),
    );
    let path = dir.join("Lastfriday.toml");
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn args(config: String) -> CliArgs {
    CliArgs {
        config,
        once: false,
        at: None,
        history: false,
        log_level: None,
        dry_run: false,
    }
}

fn once_at(config: String, day: u32) -> CliArgs {
    CliArgs {
        once: true,
        at: Some(logical(2024, 3, day, 23, 0)),
        ..args(config)
    }
}

#[tokio::test]
async fn once_fails_when_the_run_fails() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "false", true);

    let err = with_timeout(lastfriday::run(once_at(config, 22)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed"), "{err}");

    let history = HistoryStore::new(dir.path().join("history.jsonl"))
        .load()
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].final_status, RunStatus::Failed);
    assert_eq!(history[0].stage_results.len(), 2);
}

#[tokio::test]
async fn once_succeeds_when_the_gate_skips() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "false", true);

    with_timeout(lastfriday::run(once_at(config, 29)))
        .await
        .unwrap();

    assert!(!dir.path().join("downloaded").exists());
    let history = HistoryStore::new(dir.path().join("history.jsonl"))
        .load()
        .unwrap();
    assert_eq!(history[0].final_status, RunStatus::Skipped);
}

#[tokio::test]
async fn once_succeeds_when_every_stage_does() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true", false);

    with_timeout(lastfriday::run(once_at(config, 22)))
        .await
        .unwrap();
    assert!(dir.path().join("downloaded").exists());
}

#[tokio::test]
async fn history_prints_recorded_runs() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true", true);

    // Empty history is fine.
    lastfriday::run(CliArgs {
        history: true,
        ..args(config.clone())
    })
    .await
    .unwrap();

    with_timeout(lastfriday::run(once_at(config.clone(), 22)))
        .await
        .unwrap();
    lastfriday::run(CliArgs {
        history: true,
        ..args(config)
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn history_without_a_configured_file_is_an_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true", false);

    let err = lastfriday::run(CliArgs {
        history: true,
        ..args(config)
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("history"), "{err}");
}

#[tokio::test]
async fn dry_run_executes_nothing() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true", true);

    lastfriday::run(CliArgs {
        dry_run: true,
        ..args(config)
    })
    .await
    .unwrap();

    assert!(!dir.path().join("downloaded").exists());
    assert!(!dir.path().join("history.jsonl").exists());
}

#[tokio::test]
async fn invalid_config_is_reported_with_its_path() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Lastfriday.toml");
    std::fs::write(&path, "[pipeline]\nname = \"no stages\"\n").unwrap();

    let err = lastfriday::run(args(path.display().to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Lastfriday.toml"), "{err}");
}
