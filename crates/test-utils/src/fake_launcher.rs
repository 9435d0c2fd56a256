use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use lastfriday::chain::{RunOutcome, RunStatus};
use lastfriday::engine::{RunLauncher, RunTrigger, RuntimeEvent};
use lastfriday::errors::Result;

/// What a `FakeLauncher` observed; shared with the test body.
#[derive(Debug, Default)]
pub struct LaunchLog {
    launched: Mutex<Vec<RunTrigger>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl LaunchLog {
    pub fn launched(&self) -> Vec<RunTrigger> {
        self.launched.lock().unwrap().clone()
    }

    /// Highest number of runs that were executing at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// A fake launcher that:
/// - records which triggers were launched
/// - "runs" each one for `run_duration` of tokio time
/// - then reports `RunFinished` with the configured status.
pub struct FakeLauncher {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    run_duration: Duration,
    status: RunStatus,
    log: Arc<LaunchLog>,
}

impl FakeLauncher {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, run_duration: Duration) -> Self {
        Self {
            runtime_tx,
            run_duration,
            status: RunStatus::Success,
            log: Arc::new(LaunchLog::default()),
        }
    }

    pub fn reporting(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn log(&self) -> Arc<LaunchLog> {
        Arc::clone(&self.log)
    }
}

impl RunLauncher for FakeLauncher {
    fn launch(
        &mut self,
        trigger: RunTrigger,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let log = Arc::clone(&self.log);
        let run_duration = self.run_duration;
        let status = self.status;

        Box::pin(async move {
            log.launched.lock().unwrap().push(trigger.clone());

            tokio::spawn(async move {
                let now = log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                log.max_in_flight.fetch_max(now, Ordering::SeqCst);

                let started_at = Utc::now();
                tokio::time::sleep(run_duration).await;
                log.in_flight.fetch_sub(1, Ordering::SeqCst);

                let outcome = RunOutcome {
                    run_id: trigger.run_id,
                    logical_time: trigger.logical_time,
                    gate_passed: status != RunStatus::Skipped,
                    stage_results: Vec::new(),
                    final_status: status,
                    started_at,
                    finished_at: Utc::now(),
                };
                let _ = tx.send(RuntimeEvent::RunFinished(outcome)).await;
            });
            Ok(())
        })
    }
}
