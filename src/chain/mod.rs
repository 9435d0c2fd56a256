// src/chain/mod.rs

//! Dependency chain: the ordered, fail-fast sequence of stages run for one
//! eligible trigger.
//!
//! - [`stage`] holds the static stage definition and its retry policy.
//! - [`outcome`] holds the per-stage and per-run result records.
//! - [`runner`] contains [`DependencyChain`], which gates and runs the stages.

pub mod outcome;
pub mod runner;
pub mod stage;

pub use outcome::{RunOutcome, RunStatus, StageOutcome, StageResult};
pub use runner::DependencyChain;
pub use stage::{RetryPolicy, Stage};
