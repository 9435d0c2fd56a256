// src/engine/ticker.rs

//! Background task that fires a trigger at every cadence boundary.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::cadence::Cadence;
use crate::engine::clock::{Clock, wait_until};
use crate::engine::{RunTrigger, RuntimeEvent};

/// Next boundary to fire, given the current time and the last boundary that
/// already fired.
///
/// Boundaries at or before `now` are never returned, so a process started
/// late (or resumed after downtime) does not replay missed firings. The
/// `last_fired` guard keeps a clock that lags behind the timer from firing the
/// same boundary twice.
pub fn next_fire(
    cadence: &Cadence,
    now: DateTime<Utc>,
    last_fired: Option<DateTime<Utc>>,
) -> Option<DateTime<FixedOffset>> {
    let from = match last_fired {
        Some(last) if last > now => last,
        _ => now,
    };
    cadence.next_after(&from)
}

/// Spawn the ticker loop.
///
/// Each iteration computes the next boundary, sleeps until it, and sends a
/// `RuntimeEvent::TriggerFired` whose logical time is that boundary. The loop
/// ends when the runtime channel closes or the schedule has no future
/// boundaries.
pub fn spawn_ticker(
    cadence: Cadence,
    clock: Arc<dyn Clock>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(schedule = %cadence.expression(), offset = %cadence.offset(), "ticker started");
        let mut last_fired: Option<DateTime<Utc>> = None;

        loop {
            let Some(next) = next_fire(&cadence, clock.now(), last_fired) else {
                warn!("schedule has no future boundaries; ticker stopping");
                break;
            };

            info!(next = %next, "waiting for next cadence boundary");
            let next_utc = next.with_timezone(&Utc);
            wait_until(clock.as_ref(), next_utc).await;
            last_fired = Some(next_utc);

            let trigger = RunTrigger::new(next);
            debug!(run_id = %trigger.run_id, logical_time = %next, "cadence fired");

            if runtime_tx
                .send(RuntimeEvent::TriggerFired(trigger))
                .await
                .is_err()
            {
                debug!("runtime channel closed; ticker stopping");
                break;
            }
        }
    })
}
