// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{info, warn};

use crate::chain::{RunOutcome, RunStatus};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RunTrigger, RuntimeOptions, RuntimeSummary};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Launch a run for this trigger.
    StartRun(RunTrigger),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a fired trigger.
///
/// - If no run is active, the trigger becomes the active run.
/// - Otherwise it is deferred; it never starts a second, concurrent run.
pub fn handle_trigger_fired(
    active: &mut Option<RunTrigger>,
    queue: &mut TriggerQueue,
    trigger: RunTrigger,
) -> CoreStep {
    if let Some(current) = active.as_ref() {
        info!(
            active_run = %current.run_id,
            deferred_run = %trigger.run_id,
            logical_time = %trigger.logical_time,
            "run already active; deferring trigger"
        );
        queue.record(trigger);
        return CoreStep::running(Vec::new());
    }

    info!(run_id = %trigger.run_id, logical_time = %trigger.logical_time, "starting run");
    *active = Some(trigger.clone());
    CoreStep::running(vec![CoreCommand::StartRun(trigger)])
}

/// Handle a finished run.
///
/// Clears the active run, starts the next deferred trigger if there is one,
/// and in `--once` mode requests exit once nothing is left.
pub fn handle_run_finished(
    active: &mut Option<RunTrigger>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    summary: &mut RuntimeSummary,
    outcome: RunOutcome,
) -> CoreStep {
    match active.as_ref() {
        Some(current) if current.run_id == outcome.run_id => {
            *active = None;
        }
        Some(current) => {
            warn!(
                active_run = %current.run_id,
                finished_run = %outcome.run_id,
                "finish event for a run that is not the active one; ignoring"
            );
            return CoreStep::running(Vec::new());
        }
        None => {
            warn!(finished_run = %outcome.run_id, "finish event with no active run; ignoring");
            return CoreStep::running(Vec::new());
        }
    }

    info!(
        run_id = %outcome.run_id,
        status = ?outcome.final_status,
        gate_passed = outcome.gate_passed,
        "run finished"
    );

    summary.finished += 1;
    if outcome.final_status == RunStatus::Failed {
        summary.failed += 1;
    }
    summary.last_outcome = Some(outcome);

    if let Some(next) = queue.pop_next() {
        info!(run_id = %next.run_id, logical_time = %next.logical_time, "starting deferred run");
        *active = Some(next.clone());
        return CoreStep::running(vec![CoreCommand::StartRun(next)]);
    }

    if options.exit_when_idle {
        return CoreStep {
            commands: vec![CoreCommand::RequestExit],
            keep_running: false,
        };
    }

    CoreStep::running(Vec::new())
}
