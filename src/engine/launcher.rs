// src/engine/launcher.rs

//! Pluggable run launcher abstraction.
//!
//! The runtime talks to a `RunLauncher` instead of running the chain itself.
//! This makes it easy to swap in a fake launcher in tests while keeping the
//! production path in [`ChainLauncher`].
//!
//! Whatever the implementation does, it must eventually send exactly one
//! `RuntimeEvent::RunFinished` for every trigger it launches, or the runtime
//! stays busy forever.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, warn};

use crate::chain::DependencyChain;
use crate::engine::clock::{Clock, wait_until};
use crate::engine::{RunTrigger, RuntimeEvent};
use crate::errors::Result;
use crate::history::HistoryStore;

/// Trait abstracting how a run is started.
pub trait RunLauncher: Send {
    /// Start a run for `trigger`. Must not wait for the run to finish.
    fn launch(
        &mut self,
        trigger: RunTrigger,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production launcher: settle wait, chain, history, finish event.
#[derive(Debug)]
pub struct ChainLauncher {
    chain: Arc<DependencyChain>,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
    history: Option<Arc<HistoryStore>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl ChainLauncher {
    pub fn new(
        chain: Arc<DependencyChain>,
        clock: Arc<dyn Clock>,
        settle_delay: Duration,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            chain,
            clock,
            settle_delay,
            history: None,
            runtime_tx,
        }
    }

    /// Append every finished run to `history`.
    pub fn with_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }
}

impl RunLauncher for ChainLauncher {
    fn launch(
        &mut self,
        trigger: RunTrigger,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone everything the run needs so the spawned task owns it.
        let chain = Arc::clone(&self.chain);
        let clock = Arc::clone(&self.clock);
        let history = self.history.clone();
        let runtime_tx = self.runtime_tx.clone();
        let settle =
            chrono::Duration::from_std(self.settle_delay).unwrap_or(chrono::Duration::zero());

        Box::pin(async move {
            let span = info_span!("run", run_id = %trigger.run_id);
            tokio::spawn(
                async move {
                    let settle_until = trigger.logical_time.with_timezone(&Utc) + settle;
                    debug!(%settle_until, "waiting for fired instant to settle");
                    wait_until(clock.as_ref(), settle_until).await;

                    let outcome = chain.run(&trigger).await;

                    if let Some(history) = history {
                        if let Err(err) = history.append(&outcome) {
                            warn!(error = %err, "failed to append run outcome to history");
                        }
                    }

                    if runtime_tx
                        .send(RuntimeEvent::RunFinished(outcome))
                        .await
                        .is_err()
                    {
                        debug!("runtime channel closed before run finished");
                    }
                }
                .instrument(span),
            );
            Ok(())
        })
    }
}
