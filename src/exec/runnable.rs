// src/exec/runnable.rs

//! Pluggable unit-of-work abstraction.
//!
//! A stage does not know *how* its work is performed; it holds a
//! [`Runnable`] and the executor only looks at the `Ok`/`Err` it resolves to.
//!
//! - [`ShellCommand`](super::shell::ShellCommand) runs a command line through
//!   the platform shell.
//! - [`RemoteScript`](super::remote::RemoteScript) fetches a script and then
//!   runs it with an interpreter.
//! - [`InProcess`] wraps an async Rust closure (tests, embedders).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;

/// Boxed future returned by [`Runnable::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Something that can be executed once per attempt.
///
/// Implementations must be re-runnable: the executor calls `run` again for
/// every retry.
pub trait Runnable: Send + Sync + fmt::Debug {
    /// Perform one attempt. `Ok(())` is success, any error is a failed attempt
    /// and its `Display` output becomes the attempt's error detail.
    fn run(&self) -> RunFuture<'_>;

    /// One-line description for logs and dry-run output.
    fn describe(&self) -> String;
}

type BoxedFn = dyn Fn() -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync;

/// A runnable backed by an in-process async closure.
#[derive(Clone)]
pub struct InProcess {
    label: String,
    func: Arc<BoxedFn>,
}

impl InProcess {
    pub fn new<F, Fut>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(move || Box::pin(func())),
        }
    }
}

impl fmt::Debug for InProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcess")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Runnable for InProcess {
    fn run(&self) -> RunFuture<'_> {
        // The closure hands back an owned future, so nothing borrows `self`.
        (self.func)()
    }

    fn describe(&self) -> String {
        format!("in-process: {}", self.label)
    }
}
