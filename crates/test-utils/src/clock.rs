use chrono::{DateTime, Utc};
use lastfriday::engine::Clock;
use tokio::time::Instant;

/// Wall clock that follows tokio's (possibly paused) time.
///
/// `now()` is `base` plus however much tokio time has elapsed since the clock
/// was created, so auto-advancing sleeps move it forward deterministically.
#[derive(Debug, Clone)]
pub struct PausedClock {
    base: DateTime<Utc>,
    started: Instant,
}

impl PausedClock {
    /// Must be called inside a tokio runtime.
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            started: Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .expect("elapsed test time fits in chrono::Duration");
        self.base + elapsed
    }
}
