use serde::Deserialize;

/// Behaviour when a new trigger fires while a pipeline run is already active.
///
/// Either way the active run is never interrupted and the new trigger is
/// deferred; this only decides what the bounded deferral queue keeps.
///
/// - `Queue`: append the trigger; on overflow drop the oldest deferred one
///   (default behaviour).
/// - `Latest`: forget everything already deferred and keep only this trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Latest,
}

/// Which calendar rule decides whether a fired trigger may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Weekday match plus a fixed day-of-month window (22..=28 by default).
    #[default]
    DayRange,
    /// Exact "last <weekday> of the month".
    LastWeekday,
    /// Every trigger is eligible.
    Always,
}
