// tests/launcher_history.rs

mod common;
use crate::common::{init_tracing, logical, utc_at};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use lastfriday::chain::{DependencyChain, RetryPolicy, RunOutcome, RunStatus, Stage};
use lastfriday::engine::{ChainLauncher, Clock, RunLauncher, RunTrigger, RuntimeEvent};
use lastfriday::gate::CalendarGate;
use lastfriday::history::HistoryStore;
use lastfriday_test_utils::clock::PausedClock;
use lastfriday_test_utils::runnables::{CallLog, call_log, failing, succeeding};

fn chain(log: &CallLog, fail_load: bool) -> DependencyChain {
    let no_retry = RetryPolicy {
        max_retries: 0,
        retry_delay: Duration::ZERO,
    };
    let load = if fail_load {
        Stage::new("load", failing("load", log.clone()))
    } else {
        Stage::new("load", succeeding("load", log.clone()))
    };
    DependencyChain::new(
        CalendarGate::default(),
        vec![
            Stage::new("download", succeeding("download", log.clone())).with_retry(no_retry),
            load.with_retry(no_retry),
        ],
    )
}

async fn finished(rx: &mut mpsc::Receiver<RuntimeEvent>) -> RunOutcome {
    match rx.recv().await {
        Some(RuntimeEvent::RunFinished(outcome)) => outcome,
        other => panic!("expected RunFinished, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn waits_for_settle_delay_before_running() {
    init_tracing();
    let log = call_log();
    let clock = Arc::new(PausedClock::starting_at(utc_at(2024, 3, 22, 22, 59)));
    let (tx, mut rx) = mpsc::channel(8);
    let chain = Arc::new(chain(&log, false).with_clock(clock.clone()));
    let mut launcher = ChainLauncher::new(chain, clock.clone(), Duration::from_secs(5), tx);

    let trigger = RunTrigger::new(logical(2024, 3, 22, 23, 0));
    launcher.launch(trigger.clone()).await.unwrap();

    let outcome = finished(&mut rx).await;
    assert_eq!(outcome.run_id, trigger.run_id);
    assert_eq!(outcome.final_status, RunStatus::Success);
    let settled = utc_at(2024, 3, 22, 23, 0) + chrono::Duration::seconds(5);
    assert!(clock.now() >= settled);
    // Stamped from the injected clock, not the wall clock.
    assert!(outcome.started_at >= settled);
    assert!(outcome.finished_at < utc_at(2024, 3, 23, 0, 0));
    assert_eq!(*log.lock().unwrap(), vec!["download", "load"]);
}

#[tokio::test(start_paused = true)]
async fn every_finished_run_is_appended_to_history() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(HistoryStore::new(dir.path().join("history.jsonl")));
    let log = call_log();
    let clock = Arc::new(PausedClock::starting_at(utc_at(2024, 4, 1, 0, 0)));
    let (tx, mut rx) = mpsc::channel(8);
    let mut launcher = ChainLauncher::new(Arc::new(chain(&log, true)), clock, Duration::ZERO, tx)
        .with_history(Arc::clone(&store));

    // Eligible, but `load` fails.
    launcher
        .launch(RunTrigger::new(logical(2024, 3, 22, 23, 0)))
        .await
        .unwrap();
    let failed = finished(&mut rx).await;

    // Gate rejects the real last Friday of March 2024.
    launcher
        .launch(RunTrigger::new(logical(2024, 3, 29, 23, 0)))
        .await
        .unwrap();
    let skipped = finished(&mut rx).await;

    assert_eq!(failed.final_status, RunStatus::Failed);
    assert_eq!(skipped.final_status, RunStatus::Skipped);

    let history = store.load().unwrap();
    assert_eq!(history, vec![failed, skipped]);
    assert_eq!(log.lock().unwrap().len(), 2);
}
