// src/history.rs

//! Append-only run history: one JSON-serialized `RunOutcome` per line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

use crate::chain::RunOutcome;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one finished run, creating the file and its parent directories
    /// if needed.
    pub fn append(&self, outcome: &RunOutcome) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(outcome).context("serializing run outcome")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Load every recorded run, oldest first. A missing file is an empty
    /// history.
    pub fn load(&self) -> Result<Vec<RunOutcome>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut outcomes = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let outcome: RunOutcome = serde_json::from_str(line).with_context(|| {
                format!("parsing {} line {}", self.path.display(), idx + 1)
            })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{RunStatus, StageResult};
    use chrono::{FixedOffset, TimeZone, Utc};
    use uuid::Uuid;

    fn outcome(status: RunStatus) -> RunOutcome {
        RunOutcome {
            run_id: Uuid::new_v4(),
            logical_time: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 22, 23, 0, 0)
                .unwrap(),
            gate_passed: status != RunStatus::Skipped,
            stage_results: vec![StageResult::failed("download", 3, "exit 1".to_string())],
            final_status: status,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn appends_and_loads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested/history.jsonl"));

        let first = outcome(RunStatus::Failed);
        let second = outcome(RunStatus::Skipped);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("none.jsonl"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(&path, "{not json}\n").unwrap();

        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }
}
