use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use lastfriday::errors::PipelineError;
use lastfriday::exec::InProcess;

/// Shared record of which stages ran, in call order (one entry per attempt).
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// An in-process runnable that logs `label` on every attempt and fails the
/// first `failures` attempts with `"attempt N failed"`.
pub fn flaky(label: &str, failures: u32, log: CallLog) -> InProcess {
    let name = label.to_string();
    let attempts = Arc::new(AtomicU32::new(0));
    InProcess::new(label, move || {
        let name = name.clone();
        let log = Arc::clone(&log);
        let attempts = Arc::clone(&attempts);
        async move {
            log.lock().unwrap().push(name);
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= failures {
                Err(PipelineError::StageFailed(format!("attempt {attempt} failed")))
            } else {
                Ok(())
            }
        }
    })
}

/// Always succeeds.
pub fn succeeding(label: &str, log: CallLog) -> InProcess {
    flaky(label, 0, log)
}

/// Never succeeds.
pub fn failing(label: &str, log: CallLog) -> InProcess {
    flaky(label, u32::MAX, log)
}
