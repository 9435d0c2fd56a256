// src/chain/stage.rs

//! Static stage definitions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{StageAction, StageSpec};
use crate::exec::{RemoteScript, Runnable, ShellCommand};

/// Fixed-delay retry policy applied by the stage executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Wait between consecutive attempts (no backoff).
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(5 * 60),
        }
    }
}

/// One unit of work in the chain. Built once at startup, never mutated.
#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub runnable: Arc<dyn Runnable>,
    pub retry: RetryPolicy,
    /// Per-attempt wall-clock limit; `None` means unbounded.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("runnable", &self.runnable.describe())
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Stage {
    /// A stage with the default retry policy and no timeout.
    pub fn new(name: impl Into<String>, runnable: impl Runnable + 'static) -> Self {
        Self {
            name: name.into(),
            runnable: Arc::new(runnable),
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a stage from its validated config entry.
    pub fn from_spec(spec: &StageSpec) -> Self {
        let runnable: Arc<dyn Runnable> = match &spec.action {
            StageAction::Shell { cmd } => Arc::new(ShellCommand::new(cmd.clone())),
            StageAction::RemoteScript {
                source,
                dest,
                interpreter,
                fetch,
            } => Arc::new(
                RemoteScript::new(source.clone(), dest.clone())
                    .with_interpreter(interpreter.clone())
                    .with_fetch(fetch.clone()),
            ),
        };

        Self {
            name: spec.name.clone(),
            runnable,
            retry: spec.retry,
            timeout: spec.timeout,
        }
    }
}
