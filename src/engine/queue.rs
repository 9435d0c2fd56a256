use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::engine::RunTrigger;
use crate::types::TriggerWhileRunningBehaviour;

/// Triggers that fired while a run was already active.
///
/// Semantics:
/// - Deferred triggers are started one at a time, oldest first, once the
///   active run finishes. They keep their original logical time.
/// - `max_len` bounds how many are remembered. The default of 1 means "at
///   most one run is waiting behind the active one".
/// - `Queue` drops the oldest deferred trigger on overflow; `Latest` keeps only
///   the most recent one regardless of `max_len`.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_len: usize,
    pending: VecDeque<RunTrigger>,
}

impl TriggerQueue {
    /// Create a new queue with the given behaviour and maximum length.
    ///
    /// `max_len` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_len: usize) -> Self {
        Self {
            behaviour,
            max_len: max_len.max(1),
            pending: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Defer a trigger that fired while a run is active.
    pub fn record(&mut self, trigger: RunTrigger) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                debug!(run_id = %trigger.run_id, "deferring trigger (queue mode)");
                self.pending.push_back(trigger);

                while self.pending.len() > self.max_len {
                    if let Some(dropped) = self.pending.pop_front() {
                        warn!(
                            run_id = %dropped.run_id,
                            logical_time = %dropped.logical_time,
                            max_len = self.max_len,
                            "deferral queue full; dropping oldest deferred trigger"
                        );
                    }
                }
            }
            TriggerWhileRunningBehaviour::Latest => {
                for dropped in self.pending.drain(..) {
                    warn!(
                        run_id = %dropped.run_id,
                        logical_time = %dropped.logical_time,
                        "deferred trigger superseded by a newer one (latest mode)"
                    );
                }
                debug!(run_id = %trigger.run_id, "deferring trigger (latest mode)");
                self.pending.push_back(trigger);
            }
        }
    }

    /// Take the next deferred trigger, oldest first.
    pub fn pop_next(&mut self) -> Option<RunTrigger> {
        self.pending.pop_front()
    }
}
