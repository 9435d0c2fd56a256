// src/config/mod.rs

//! Configuration loading and validation for lastfriday.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into the immutable `PipelineConfig` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{
    DefaultSection, GateSection, PipelineConfig, PipelineSection, RawConfigFile, StageAction,
    StageConfig, StageSpec,
};
pub use validate::parse_utc_offset;
