// src/gate.rs

//! Calendar gate: decides whether a fired trigger is allowed to run the chain.
//!
//! The gate is a pure predicate over the trigger's logical time, evaluated in
//! whatever offset the timestamp carries (the pipeline's configured offset for
//! scheduled triggers).
//!
//! The default rule approximates "last Friday of the month" as "a Friday whose
//! day-of-month is in 22..=28". Months whose last Friday lands on the 29th,
//! 30th or 31st (e.g. March 2024) are therefore never eligible under the
//! default rule. [`CalendarGate::LastWeekday`] is the exact alternative.

use chrono::{DateTime, Datelike, Days, TimeZone, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarGate {
    /// Eligible iff the weekday matches and `first_day <= day <= last_day`.
    DayRange {
        weekday: Weekday,
        first_day: u32,
        last_day: u32,
    },
    /// Eligible iff the weekday matches and no later day of the same month
    /// has that weekday.
    LastWeekday { weekday: Weekday },
    /// Every trigger is eligible.
    Always,
}

impl Default for CalendarGate {
    fn default() -> Self {
        CalendarGate::DayRange {
            weekday: Weekday::Fri,
            first_day: 22,
            last_day: 28,
        }
    }
}

impl CalendarGate {
    /// Exact "last `weekday` of the month" rule.
    pub fn last_weekday(weekday: Weekday) -> Self {
        CalendarGate::LastWeekday { weekday }
    }

    /// Evaluate the gate against a logical time. Never fails.
    pub fn is_eligible<Tz: TimeZone>(&self, logical_time: &DateTime<Tz>) -> bool {
        match *self {
            CalendarGate::DayRange {
                weekday,
                first_day,
                last_day,
            } => {
                let day = logical_time.day();
                logical_time.weekday() == weekday && (first_day..=last_day).contains(&day)
            }
            CalendarGate::LastWeekday { weekday } => {
                if logical_time.weekday() != weekday {
                    return false;
                }
                let date = logical_time.date_naive();
                // One week later either leaves the month or overflows the calendar.
                date.checked_add_days(Days::new(7))
                    .is_none_or(|next| next.month() != date.month())
            }
            CalendarGate::Always => true,
        }
    }

    /// Short human-readable description (dry-run output, logs).
    pub fn describe(&self) -> String {
        match self {
            CalendarGate::DayRange {
                weekday,
                first_day,
                last_day,
            } => format!("{weekday} with day-of-month in {first_day}..={last_day}"),
            CalendarGate::LastWeekday { weekday } => format!("last {weekday} of the month"),
            CalendarGate::Always => "always".to_string(),
        }
    }
}
