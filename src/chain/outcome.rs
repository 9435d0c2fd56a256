// src/chain/outcome.rs

//! Result records produced by the executor and the chain.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final outcome of one stage after its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    Success,
    Failed,
}

/// What the executor reports for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_name: String,
    /// Attempts made, including the first one.
    pub attempt_count: u32,
    pub outcome: StageOutcome,
    /// Detail of the last failing attempt; `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl StageResult {
    pub fn success(stage_name: &str, attempt_count: u32) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            attempt_count,
            outcome: StageOutcome::Success,
            error_detail: None,
        }
    }

    pub fn failed(stage_name: &str, attempt_count: u32, detail: String) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            attempt_count,
            outcome: StageOutcome::Failed,
            error_detail: Some(detail),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == StageOutcome::Success
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The calendar gate rejected the trigger; no stage ran.
    Skipped,
    Success,
    Failed,
}

/// Record of one run, finalized once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub logical_time: DateTime<FixedOffset>,
    pub gate_passed: bool,
    /// In chain order; stops at the first failed stage.
    pub stage_results: Vec<StageResult>,
    pub final_status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
