// src/exec/mod.rs

//! Stage execution layer.
//!
//! This module turns a [`Stage`](crate::chain::Stage) into a final
//! [`StageResult`](crate::chain::StageResult):
//!
//! - [`runnable`] defines the `Runnable` trait stages hold, plus the
//!   in-process variant.
//! - [`shell`] runs command lines via `tokio::process::Command`.
//! - [`remote`] implements copy-then-run for scripts kept in remote storage.
//! - [`executor`] owns per-stage retry and attempt timeouts.
//! - [`duration`] parses the duration strings used throughout the config.

pub mod duration;
pub mod executor;
pub mod remote;
pub mod runnable;
pub mod shell;

pub use duration::parse_duration;
pub use executor::execute;
pub use remote::RemoteScript;
pub use runnable::{InProcess, RunFuture, Runnable};
pub use shell::ShellCommand;
