// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid schedule '{expr}': {reason}")]
    InvalidSchedule { expr: String, reason: String },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("command `{command}` exited with code {code}{stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        /// Tail of the command's stderr, already prefixed with ": " when
        /// non-empty.
        stderr: String,
    },

    #[error("attempt timed out after {0:?}")]
    AttemptTimedOut(Duration),

    #[error("stage attempt failed: {0}")]
    StageFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
