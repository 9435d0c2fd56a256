#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

pub use lastfriday_test_utils::init_tracing;

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// Logical time at `hh:mm` UTC on the given date.
pub fn logical(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<FixedOffset> {
    utc().with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
}

pub fn utc_at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
}
