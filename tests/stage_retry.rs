// tests/stage_retry.rs

mod common;
use crate::common::init_tracing;

use std::time::Duration;

use lastfriday::chain::{RetryPolicy, Stage, StageOutcome};
use lastfriday::exec::{InProcess, execute};
use lastfriday_test_utils::runnables::{call_log, failing, flaky};

#[tokio::test(start_paused = true)]
async fn recovers_within_default_budget() {
    init_tracing();
    let log = call_log();
    let stage = Stage::new("download", flaky("download", 2, log.clone()));

    let started = tokio::time::Instant::now();
    let result = execute(&stage).await;

    assert_eq!(result.outcome, StageOutcome::Success);
    assert_eq!(result.attempt_count, 3);
    assert!(result.error_detail.is_none());
    assert_eq!(log.lock().unwrap().len(), 3);
    // Two 5 minute waits between three attempts.
    assert!(started.elapsed() >= Duration::from_secs(600));
}

#[tokio::test(start_paused = true)]
async fn exhausted_budget_reports_last_error() {
    init_tracing();
    let log = call_log();
    let stage = Stage::new("load", failing("load", log.clone())).with_retry(RetryPolicy {
        max_retries: 4,
        retry_delay: Duration::from_secs(30),
    });

    let started = tokio::time::Instant::now();
    let result = execute(&stage).await;

    assert_eq!(result.outcome, StageOutcome::Failed);
    assert_eq!(result.attempt_count, 5);
    assert_eq!(
        result.error_detail.as_deref(),
        Some("stage attempt failed: attempt 5 failed")
    );
    assert_eq!(log.lock().unwrap().len(), 5);
    // No sleep after the final attempt.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(120));
    assert!(elapsed < Duration::from_secs(150));
}

#[tokio::test(start_paused = true)]
async fn hung_attempts_are_cut_off_by_timeout() {
    init_tracing();
    let hang = InProcess::new("hang", || async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    });
    let stage = Stage::new("transform", hang)
        .with_retry(RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
        .with_timeout(Duration::from_secs(60));

    let result = execute(&stage).await;

    assert_eq!(result.outcome, StageOutcome::Failed);
    assert_eq!(result.attempt_count, 2);
    assert!(
        result.error_detail.as_deref().unwrap_or_default().contains("timed out"),
        "{:?}",
        result.error_detail
    );
}
