// src/exec/remote.rs

//! Copy-then-run runnable: fetch a script from remote storage, then execute
//! it locally with an interpreter.

use crate::errors::Result;
use crate::exec::runnable::{RunFuture, Runnable};
use crate::exec::shell::run_shell;

/// Default fetch command; `{source}` and `{dest}` are substituted.
pub const DEFAULT_FETCH: &str = "gsutil cp {source} {dest}";

/// Default interpreter used to run the fetched script.
pub const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    source: String,
    dest: String,
    interpreter: String,
    fetch: String,
}

impl RemoteScript {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            fetch: DEFAULT_FETCH.to_string(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_fetch(mut self, fetch: impl Into<String>) -> Self {
        self.fetch = fetch.into();
        self
    }

    /// The fully substituted fetch command line.
    pub fn fetch_command(&self) -> String {
        self.fetch
            .replace("{source}", &self.source)
            .replace("{dest}", &self.dest)
    }

    /// The command line that runs the fetched script.
    pub fn run_command(&self) -> String {
        format!("{} {}", self.interpreter, self.dest)
    }

    async fn fetch_and_run(&self) -> Result<()> {
        run_shell(&self.fetch_command()).await?;
        run_shell(&self.run_command()).await
    }
}

impl Runnable for RemoteScript {
    fn run(&self) -> RunFuture<'_> {
        Box::pin(self.fetch_and_run())
    }

    fn describe(&self) -> String {
        format!("{} && {}", self.fetch_command(), self.run_command())
    }
}
