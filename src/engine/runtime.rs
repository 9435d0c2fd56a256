// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::CoreRuntime;
use crate::engine::launcher::RunLauncher;
use crate::engine::{CoreCommand, RuntimeEvent, RuntimeSummary};
use crate::errors::Result;

/// Drives the single-flight core in response to `RuntimeEvent`s, and
/// delegates actual runs to a `RunLauncher`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<L: RunLauncher> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    launcher: L,
}

impl<L: RunLauncher> fmt::Debug for Runtime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<L: RunLauncher> Runtime<L> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, launcher: L) -> Self {
        Self {
            core,
            event_rx,
            launcher,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (launch runs, exit).
    ///
    /// Returns what happened to the runs that finished while it was running.
    pub async fn run(mut self) -> Result<RuntimeSummary> {
        info!("lastfriday runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        if let Some(active) = self.core.active() {
            info!(run_id = %active.run_id, "runtime exiting with a run still active");
        }

        Ok(self.core.into_summary())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartRun(trigger) => {
                debug!(run_id = %trigger.run_id, "launching run");
                self.launcher.launch(trigger).await?;
            }
            CoreCommand::RequestExit => {
                // keep_running=false already stops the loop; nothing else to do.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}
