// src/exec/executor.rs

//! Stage executor: runs one stage to a final outcome, owning its retries.
//!
//! Transient failures are absorbed here and only logged; callers see a single
//! [`StageResult`] once the stage succeeded or its retry budget ran out.

use tokio::time::{sleep, timeout};
use tracing::{Instrument, error, info, info_span, warn};

use crate::chain::{Stage, StageResult};
use crate::errors::{PipelineError, Result};

/// Execute `stage`, retrying failed attempts with a fixed delay.
///
/// At most `1 + stage.retry.max_retries` attempts are made, with
/// `stage.retry.retry_delay` between consecutive attempts. The returned
/// result records how many attempts ran and, on failure, the detail of the
/// last one.
pub async fn execute(stage: &Stage) -> StageResult {
    let max_attempts = stage.retry.max_retries.saturating_add(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let span = info_span!("attempt", stage = %stage.name, attempt);
        let result = run_attempt(stage).instrument(span).await;

        match result {
            Ok(()) => {
                info!(stage = %stage.name, attempt, "stage succeeded");
                return StageResult::success(&stage.name, attempt);
            }
            Err(err) => {
                let detail = err.to_string();
                if attempt >= max_attempts {
                    error!(
                        stage = %stage.name,
                        attempts = attempt,
                        error = %detail,
                        "stage failed; retry budget exhausted"
                    );
                    return StageResult::failed(&stage.name, attempt, detail);
                }

                warn!(
                    stage = %stage.name,
                    attempt,
                    max_attempts,
                    retry_in = ?stage.retry.retry_delay,
                    error = %detail,
                    "stage attempt failed; will retry"
                );
                sleep(stage.retry.retry_delay).await;
            }
        }
    }
}

/// One attempt, bounded by the stage timeout if it has one.
async fn run_attempt(stage: &Stage) -> Result<()> {
    match stage.timeout {
        Some(limit) => match timeout(limit, stage.runnable.run()).await {
            Ok(result) => result,
            // Dropping the attempt future kills the shell and its process group.
            Err(_elapsed) => Err(PipelineError::AttemptTimedOut(limit)),
        },
        None => stage.runnable.run().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{RetryPolicy, StageOutcome};
    use crate::exec::InProcess;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn flaky(failures: u32, calls: Arc<AtomicU32>) -> InProcess {
        InProcess::new("flaky", move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    Err(PipelineError::StageFailed(format!("attempt {n} failed")))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_two_failures_takes_three_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let stage = Stage::new("download", flaky(2, Arc::clone(&calls)));

        let result = execute(&stage).await;

        assert_eq!(result.outcome, StageOutcome::Success);
        assert_eq!(result.attempt_count, 3);
        assert_eq!(result.error_detail, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let stage = Stage::new("load", flaky(u32::MAX, Arc::clone(&calls)));

        let result = execute(&stage).await;

        assert_eq!(result.outcome, StageOutcome::Failed);
        assert_eq!(result.attempt_count, 3);
        assert_eq!(
            result.error_detail.as_deref(),
            Some("stage attempt failed: attempt 3 failed")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_fixed_delay_between_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let stage = Stage::new("transform", flaky(2, Arc::clone(&calls))).with_retry(RetryPolicy {
            max_retries: 2,
            retry_delay: Duration::from_secs(300),
        });

        let started = tokio::time::Instant::now();
        execute(&stage).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(600), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(601), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let stage = Stage::new("once", flaky(1, Arc::clone(&calls))).with_retry(RetryPolicy {
            max_retries: 0,
            retry_delay: Duration::from_secs(300),
        });

        let result = execute(&stage).await;

        assert_eq!(result.outcome, StageOutcome::Failed);
        assert_eq!(result.attempt_count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_attempt_times_out_and_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let hangs_once = InProcess::new("hang", move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    std::future::pending::<()>().await;
                }
                Ok(())
            }
        });
        let stage = Stage::new("slow", hangs_once)
            .with_retry(RetryPolicy {
                max_retries: 1,
                retry_delay: Duration::from_secs(1),
            })
            .with_timeout(Duration::from_secs(60));

        let result = execute(&stage).await;

        assert_eq!(result.outcome, StageOutcome::Success);
        assert_eq!(result.attempt_count, 2);
    }
}
