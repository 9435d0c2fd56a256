// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::chain::RetryPolicy;
use crate::engine::Cadence;
use crate::gate::CalendarGate;
use crate::types::{GateKind, TriggerWhileRunningBehaviour};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pipeline]
/// name = "elt_pipeline_nyc_taxi"
/// schedule = "0 0 23 * * Fri"
///
/// [gate]
/// kind = "day_range"
///
/// [default]
/// retries = 2
/// retry_delay = "5m"
///
/// [[stage]]
/// name = "download_taxi_data"
/// source = "gs://bucket/from-git/download_taxi_data.py"
/// dest = "/tmp/download_taxi_data.py"
///
/// [[stage]]
/// name = "load_raw_trips_data"
/// cmd = "python3 load.py"
/// ```
///
/// Every section except `[[stage]]` is optional and has defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub gate: GateSection,

    /// Retry/timeout defaults applied to stages that do not override them.
    #[serde(default)]
    pub default: DefaultSection,

    /// Stages in execution order.
    #[serde(default)]
    pub stage: Vec<StageConfig>,
}

/// `[pipeline]` section: identity, cadence and run-control settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Six- or seven-field cron expression (seconds first).
    #[serde(default = "default_schedule")]
    pub schedule: String,

    /// Offset the schedule and the gate are evaluated in, e.g. `"+01:00"`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Wait after the fired instant before evaluating the gate.
    #[serde(default = "default_settle_delay")]
    pub settle_delay: String,

    /// Maximum number of deferred triggers kept while a run is active.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Optional JSON-lines file receiving one record per finished run.
    #[serde(default)]
    pub history: Option<PathBuf>,
}

fn default_name() -> String {
    "lastfriday".to_string()
}

fn default_schedule() -> String {
    "0 0 23 * * Fri".to_string()
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_settle_delay() -> String {
    "1s".to_string()
}

fn default_queue_length() -> usize {
    1
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            owner: None,
            tags: Vec::new(),
            schedule: default_schedule(),
            utc_offset: default_utc_offset(),
            settle_delay: default_settle_delay(),
            queue_length: default_queue_length(),
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            history: None,
        }
    }
}

/// `[gate]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSection {
    #[serde(default)]
    pub kind: GateKind,

    /// Weekday name as accepted by chrono (`"Fri"`, `"friday"`).
    #[serde(default = "default_weekday")]
    pub weekday: String,

    /// Only used by `kind = "day_range"`.
    #[serde(default = "default_first_day")]
    pub first_day: u32,

    /// Only used by `kind = "day_range"`.
    #[serde(default = "default_last_day")]
    pub last_day: u32,
}

fn default_weekday() -> String {
    "Fri".to_string()
}

fn default_first_day() -> u32 {
    22
}

fn default_last_day() -> u32 {
    28
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            kind: GateKind::default(),
            weekday: default_weekday(),
            first_day: default_first_day(),
            last_day: default_last_day(),
        }
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSection {
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    /// Per-attempt timeout; unbounded when absent.
    #[serde(default)]
    pub timeout: Option<String>,
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay() -> String {
    "5m".to_string()
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay: default_retry_delay(),
            timeout: None,
        }
    }
}

/// One `[[stage]]` table.
///
/// Exactly one of `cmd` or `source` + `dest` must be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub name: String,

    /// Shell command line.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Remote script location, fetched to `dest` before each attempt.
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub dest: Option<String>,

    /// Interpreter for the fetched script (default `python3`).
    #[serde(default)]
    pub interpreter: Option<String>,

    /// Fetch command template with `{source}` / `{dest}` placeholders
    /// (default `gsutil cp {source} {dest}`).
    #[serde(default)]
    pub fetch: Option<String>,

    #[serde(default)]
    pub retries: Option<u32>,

    #[serde(default)]
    pub retry_delay: Option<String>,

    #[serde(default)]
    pub timeout: Option<String>,
}

/// What a validated stage does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    Shell {
        cmd: String,
    },
    RemoteScript {
        source: String,
        dest: String,
        interpreter: String,
        fetch: String,
    },
}

/// A validated stage entry with defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub name: String,
    pub action: StageAction,
    pub retry: RetryPolicy,
    pub timeout: Option<Duration>,
}

/// The validated, immutable pipeline definition.
///
/// Built once at startup via `PipelineConfig::try_from(RawConfigFile)` and
/// handed to the chain and the runtime; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub cadence: Cadence,
    pub settle_delay: Duration,
    pub queue_length: usize,
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,
    pub history: Option<PathBuf>,
    pub gate: CalendarGate,
    pub stages: Vec<StageSpec>,
}
