// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing `StartRun` commands to the launcher
//! - handling Ctrl+C / shutdown
//!
//! Single-flight lives here: at most one trigger is active at a time, and
//! triggers that fire meanwhile are deferred in the [`TriggerQueue`].

use crate::engine::event_handlers::{CoreStep, handle_run_finished, handle_trigger_fired};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RunTrigger, RuntimeEvent, RuntimeOptions, RuntimeSummary};
use crate::types::TriggerWhileRunningBehaviour;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    active: Option<RunTrigger>,
    queue: TriggerQueue,
    options: RuntimeOptions,
    summary: RuntimeSummary,
}

impl CoreRuntime {
    pub fn new(
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            active: None,
            queue: TriggerQueue::new(behaviour, queue_length),
            options,
            summary: RuntimeSummary::default(),
        }
    }

    /// Whether no run is active.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// The currently active trigger, if any.
    pub fn active(&self) -> Option<&RunTrigger> {
        self.active.as_ref()
    }

    /// Number of deferred triggers waiting behind the active run.
    pub fn deferred(&self) -> usize {
        self.queue.len()
    }

    pub fn summary(&self) -> &RuntimeSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RuntimeSummary {
        self.summary
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TriggerFired(trigger) => {
                handle_trigger_fired(&mut self.active, &mut self.queue, trigger)
            }
            RuntimeEvent::RunFinished(outcome) => handle_run_finished(
                &mut self.active,
                &mut self.queue,
                &self.options,
                &mut self.summary,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
