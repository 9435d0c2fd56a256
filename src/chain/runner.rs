use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chain::outcome::{RunOutcome, RunStatus};
use crate::chain::stage::Stage;
use crate::config::PipelineConfig;
use crate::engine::{Clock, RunTrigger, SystemClock};
use crate::exec;
use crate::gate::CalendarGate;

/// The gate plus the ordered stages of the pipeline.
///
/// Running the chain for a trigger:
/// - evaluates the calendar gate against the trigger's logical time
/// - runs each stage through the executor, in declared order
/// - stops at the first stage that is still failing after its retries
#[derive(Debug, Clone)]
pub struct DependencyChain {
    gate: CalendarGate,
    stages: Vec<Stage>,
    clock: Arc<dyn Clock>,
}

impl DependencyChain {
    pub fn new(gate: CalendarGate, stages: Vec<Stage>) -> Self {
        Self {
            gate,
            stages,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp `started_at` / `finished_at` from `clock` instead of the system
    /// clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Construct the chain from a validated [`PipelineConfig`].
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        let stages = cfg.stages.iter().map(Stage::from_spec).collect();
        Self::new(cfg.gate, stages)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the chain for one trigger and return its finalized outcome.
    ///
    /// The chain itself never errors: a stage's exhausted failure becomes
    /// `RunStatus::Failed`, a rejected gate becomes `RunStatus::Skipped`.
    pub async fn run(&self, trigger: &RunTrigger) -> RunOutcome {
        let started_at = self.clock.now();
        let run_id = trigger.run_id;

        if !self.gate.is_eligible(&trigger.logical_time) {
            info!(
                %run_id,
                logical_time = %trigger.logical_time,
                gate = %self.gate.describe(),
                "calendar gate rejected trigger; skipping run"
            );
            return RunOutcome {
                run_id,
                logical_time: trigger.logical_time,
                gate_passed: false,
                stage_results: Vec::new(),
                final_status: RunStatus::Skipped,
                started_at,
                finished_at: self.clock.now(),
            };
        }

        info!(
            %run_id,
            logical_time = %trigger.logical_time,
            stages = self.stages.len(),
            "calendar gate passed; running chain"
        );

        let mut stage_results = Vec::with_capacity(self.stages.len());
        let mut final_status = RunStatus::Success;

        for (idx, stage) in self.stages.iter().enumerate() {
            debug!(%run_id, stage = %stage.name, position = idx + 1, "dispatching stage");

            let result = exec::execute(stage).await;
            let succeeded = result.is_success();
            stage_results.push(result);

            if !succeeded {
                let skipped: Vec<&str> = self.stages[idx + 1..]
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect();
                error!(
                    %run_id,
                    stage = %stage.name,
                    ?skipped,
                    "stage exhausted its retries; aborting chain"
                );
                final_status = RunStatus::Failed;
                break;
            }
        }

        if final_status == RunStatus::Success {
            info!(%run_id, "all stages succeeded");
        }

        RunOutcome {
            run_id,
            logical_time: trigger.logical_time,
            gate_passed: true,
            stage_results,
            final_status,
            started_at,
            finished_at: self.clock.now(),
        }
    }
}
