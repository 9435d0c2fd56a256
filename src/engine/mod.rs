// src/engine/mod.rs

//! Scheduling engine for lastfriday.
//!
//! This module ties together:
//! - the cadence (cron schedule in the pipeline's offset) and the ticker task
//!   that fires a [`RunTrigger`] at each boundary
//! - the deferral queue (what happens when triggers fire while a run is active)
//! - the main runtime event loop that reacts to:
//!   - fired triggers
//!   - finished runs
//!   - shutdown signals
//!
//! The pure single-flight state machine lives in [`core`]; the async/IO shell
//! is implemented in [`runtime`], and actual runs are started through a
//! [`RunLauncher`].

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::chain::RunOutcome;

/// One firing of the pipeline. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTrigger {
    /// The scheduled instant this run stands for (not the wall-clock time the
    /// run actually starts, which may be later if it was deferred).
    pub logical_time: DateTime<FixedOffset>,
    pub run_id: Uuid,
}

impl RunTrigger {
    pub fn new(logical_time: DateTime<FixedOffset>) -> Self {
        Self {
            logical_time,
            run_id: Uuid::new_v4(),
        }
    }
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no run is active and nothing is
    /// deferred (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the ticker, launcher, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The cadence fired (or a manual trigger was requested).
    TriggerFired(RunTrigger),
    /// A launched run reached its final outcome.
    RunFinished(RunOutcome),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// What the runtime observed before it stopped.
#[derive(Debug, Clone, Default)]
pub struct RuntimeSummary {
    /// Runs that reached a final outcome.
    pub finished: usize,
    /// Of those, runs whose final status was `Failed`.
    pub failed: usize,
    pub last_outcome: Option<RunOutcome>,
}

pub mod cadence;
pub mod clock;
pub mod core;
pub mod event_handlers;
pub mod launcher;
pub mod queue;
pub mod runtime;
pub mod ticker;

pub use cadence::Cadence;
pub use clock::{Clock, SystemClock, wait_until};
pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use launcher::{ChainLauncher, RunLauncher};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
pub use ticker::{next_fire, spawn_ticker};
pub use crate::types::TriggerWhileRunningBehaviour;
