// src/config/validate.rs

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Weekday};

use crate::chain::RetryPolicy;
use crate::config::model::{
    DefaultSection, GateSection, PipelineConfig, RawConfigFile, StageAction, StageConfig,
    StageSpec,
};
use crate::engine::Cadence;
use crate::errors::{PipelineError, Result};
use crate::exec::parse_duration;
use crate::exec::remote::{DEFAULT_FETCH, DEFAULT_INTERPRETER};
use crate::gate::CalendarGate;
use crate::types::GateKind;

impl TryFrom<RawConfigFile> for PipelineConfig {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_stages(&raw)?;
        ensure_unique_stage_names(&raw)?;

        let p = raw.pipeline;
        if p.name.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "[pipeline].name must not be empty".to_string(),
            ));
        }
        if p.queue_length == 0 {
            return Err(PipelineError::ConfigError(
                "[pipeline].queue_length must be >= 1 (got 0)".to_string(),
            ));
        }

        let offset = parse_utc_offset(&p.utc_offset)?;
        let cadence = Cadence::parse(&p.schedule, offset)?;
        let settle_delay = parse_duration(&p.settle_delay)?;
        let gate = build_gate(&raw.gate)?;

        let stages = raw
            .stage
            .iter()
            .map(|stage| build_stage(stage, &raw.default))
            .collect::<Result<Vec<_>>>()?;

        Ok(PipelineConfig {
            name: p.name,
            description: p.description,
            owner: p.owner,
            tags: p.tags,
            cadence,
            settle_delay,
            queue_length: p.queue_length,
            triggered_while_running_behaviour: p.triggered_while_running_behaviour,
            history: p.history,
            gate,
            stages,
        })
    }
}

fn ensure_has_stages(cfg: &RawConfigFile) -> Result<()> {
    if cfg.stage.is_empty() {
        return Err(PipelineError::ConfigError(
            "config must contain at least one [[stage]] table".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_stage_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for stage in cfg.stage.iter() {
        if stage.name.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "every [[stage]] needs a non-empty name".to_string(),
            ));
        }
        if !seen.insert(stage.name.as_str()) {
            return Err(PipelineError::ConfigError(format!(
                "duplicate stage name '{}'",
                stage.name
            )));
        }
    }
    Ok(())
}

/// Accepts `"+HH:MM"` / `"-HH:MM"` plus `"UTC"` and `"Z"`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| PipelineError::ConfigError("invalid zero offset".to_string()));
    }

    let invalid = || {
        PipelineError::ConfigError(format!(
            "[pipeline].utc_offset '{s}' is not a valid offset like \"+01:00\""
        ))
    };

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    let seconds = i32::try_from(hours * 3600 + minutes * 60).map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * seconds).ok_or_else(invalid)
}

fn build_gate(gate: &GateSection) -> Result<CalendarGate> {
    let weekday = Weekday::from_str(gate.weekday.trim()).map_err(|_| {
        PipelineError::ConfigError(format!(
            "[gate].weekday '{}' is not a weekday name",
            gate.weekday
        ))
    })?;

    match gate.kind {
        GateKind::DayRange => {
            let (first_day, last_day) = (gate.first_day, gate.last_day);
            if !(1..=31).contains(&first_day) || !(1..=31).contains(&last_day) {
                return Err(PipelineError::ConfigError(format!(
                    "[gate] day bounds must be within 1..=31 (got {first_day}..={last_day})"
                )));
            }
            if first_day > last_day {
                return Err(PipelineError::ConfigError(format!(
                    "[gate].first_day ({first_day}) must not exceed last_day ({last_day})"
                )));
            }
            Ok(CalendarGate::DayRange {
                weekday,
                first_day,
                last_day,
            })
        }
        GateKind::LastWeekday => Ok(CalendarGate::LastWeekday { weekday }),
        GateKind::Always => Ok(CalendarGate::Always),
    }
}

fn build_stage(stage: &StageConfig, defaults: &DefaultSection) -> Result<StageSpec> {
    let action = match (&stage.cmd, &stage.source, &stage.dest) {
        (Some(cmd), None, None) => {
            if cmd.trim().is_empty() {
                return Err(PipelineError::ConfigError(format!(
                    "stage '{}' has an empty `cmd`",
                    stage.name
                )));
            }
            StageAction::Shell { cmd: cmd.clone() }
        }
        (None, Some(source), Some(dest)) => StageAction::RemoteScript {
            source: source.clone(),
            dest: dest.clone(),
            interpreter: stage
                .interpreter
                .clone()
                .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string()),
            fetch: stage
                .fetch
                .clone()
                .unwrap_or_else(|| DEFAULT_FETCH.to_string()),
        },
        (None, Some(_), None) | (None, None, Some(_)) => {
            return Err(PipelineError::ConfigError(format!(
                "stage '{}' needs both `source` and `dest` for a remote script",
                stage.name
            )));
        }
        (None, None, None) => {
            return Err(PipelineError::ConfigError(format!(
                "stage '{}' needs either `cmd` or `source` + `dest`",
                stage.name
            )));
        }
        (Some(_), _, _) => {
            return Err(PipelineError::ConfigError(format!(
                "stage '{}' sets both `cmd` and a remote script; pick one",
                stage.name
            )));
        }
    };

    if matches!(action, StageAction::Shell { .. })
        && (stage.interpreter.is_some() || stage.fetch.is_some())
    {
        return Err(PipelineError::ConfigError(format!(
            "stage '{}': `interpreter` and `fetch` only apply to remote scripts",
            stage.name
        )));
    }

    let retry = RetryPolicy {
        max_retries: stage.retries.unwrap_or(defaults.retries),
        retry_delay: parse_duration(
            stage
                .retry_delay
                .as_deref()
                .unwrap_or(&defaults.retry_delay),
        )?,
    };

    let timeout = match stage.timeout.as_deref().or(defaults.timeout.as_deref()) {
        Some(s) => Some(parse_timeout(&stage.name, s)?),
        None => None,
    };

    Ok(StageSpec {
        name: stage.name.clone(),
        action,
        retry,
        timeout,
    })
}

fn parse_timeout(stage: &str, s: &str) -> Result<Duration> {
    let timeout = parse_duration(s)?;
    if timeout.is_zero() {
        return Err(PipelineError::ConfigError(format!(
            "stage '{stage}' has a zero timeout"
        )));
    }
    Ok(timeout)
}
