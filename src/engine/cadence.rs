// src/engine/cadence.rs

//! Cron cadence evaluated in a fixed UTC offset.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeZone};
use cron::Schedule;

use crate::errors::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct Cadence {
    expr: String,
    schedule: Schedule,
    offset: FixedOffset,
}

impl Cadence {
    /// Parse a six- or seven-field cron expression (seconds first, e.g.
    /// `"0 0 23 * * Fri"`).
    ///
    /// Five-field crontab lines are rejected rather than guessed at: their
    /// numeric day-of-week does not mean the same thing here.
    pub fn parse(expr: &str, offset: FixedOffset) -> Result<Self> {
        let fields = expr.split_whitespace().count();
        if !(6..=7).contains(&fields) {
            return Err(PipelineError::InvalidSchedule {
                expr: expr.to_string(),
                reason: format!(
                    "expected 6 or 7 fields (sec min hour day-of-month month day-of-week [year]), got {fields}"
                ),
            });
        }

        let schedule = Schedule::from_str(expr).map_err(|e| PipelineError::InvalidSchedule {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            expr: expr.split_whitespace().collect::<Vec<_>>().join(" "),
            schedule,
            offset,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expr
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First cadence boundary strictly after `instant`, in the cadence offset.
    pub fn next_after<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> Option<DateTime<FixedOffset>> {
        let local = instant.with_timezone(&self.offset);
        self.schedule.after(&local).next()
    }
}
