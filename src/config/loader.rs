// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{PipelineConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate stages,
/// the cron expression, durations or the gate. Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserialize config from an in-memory TOML string.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it into the immutable
/// [`PipelineConfig`].
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let raw_config = load_from_path(&path)?;
    PipelineConfig::try_from(raw_config)
}
