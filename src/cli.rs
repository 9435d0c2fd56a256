// src/cli.rs

//! CLI argument parsing using `clap`.

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, ValueEnum};

/// Command-line arguments for `lastfriday`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lastfriday",
    version,
    about = "Run a calendar-gated, ordered stage pipeline on a cron cadence.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Lastfriday.toml")]
    pub config: String,

    /// Fire a single manual trigger, wait for its run, then exit.
    ///
    /// The calendar gate still applies to the trigger's logical time.
    #[arg(long)]
    pub once: bool,

    /// Logical time for `--once` (RFC 3339). Defaults to now; must not be in
    /// the future.
    #[arg(long, value_name = "TIME", requires = "once", value_parser = parse_logical_time)]
    pub at: Option<DateTime<FixedOffset>>,

    /// Print the recorded run history and exit.
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    pub history: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LASTFRIDAY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the pipeline, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_logical_time(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let at =
        DateTime::parse_from_rfc3339(s).map_err(|e| format!("expected RFC 3339 time: {e}"))?;
    // The run would otherwise sleep until `at` before doing anything.
    if at > Utc::now() {
        return Err(format!("{s} is in the future"));
    }
    Ok(at)
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
