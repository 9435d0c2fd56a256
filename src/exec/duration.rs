// src/exec/duration.rs

//! Parsing of the short duration strings used in the config
//! (`retry_delay = "5m"`, `settle_delay = "1s"`, `timeout = "2h"`).

use std::time::Duration;

use crate::errors::{PipelineError, Result};

/// Parse `<number><unit>` where unit is one of `ms`, `s`, `m`, `h`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PipelineError::InvalidDuration(
            "empty duration string".to_string(),
        ));
    }

    // Find the boundary between digits and suffix.
    let idx = s.chars().position(|c| !c.is_ascii_digit()).ok_or_else(|| {
        PipelineError::InvalidDuration(format!("duration '{s}' is missing a unit suffix"))
    })?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part.parse().map_err(|e| {
        PipelineError::InvalidDuration(format!("invalid duration number '{num_part}': {e}"))
    })?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(PipelineError::InvalidDuration(format!(
            "unsupported duration unit '{unit}' in '{s}'; expected ms, s, m, or h"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration(" 2h ").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("m5").is_err());
        assert!(parse_duration("3d").is_err());
    }
}
