// src/engine/clock.rs

//! Wall-clock abstraction used by the ticker and the settling wait.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use tokio::time::sleep;

/// Source of "now". Production uses [`SystemClock`]; tests substitute a clock
/// that follows tokio's paused time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Block until `target` has passed according to `clock`.
///
/// This is a single computed sleep, not a polling loop. A target in the past
/// returns immediately.
pub async fn wait_until(clock: &dyn Clock, target: DateTime<Utc>) {
    let remaining = (target - clock.now()).to_std().unwrap_or_default();
    if !remaining.is_zero() {
        sleep(remaining).await;
    }
}
