// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for Go-style duration strings.
//!
//! Command-line flags such as `--kubeconfig-rotation-period=24h` or
//! `--gardener-request-timeout=60s` are parsed into `std::time::Duration`.
//! Segments may be chained (`1h30m`).

use anyhow::{bail, Context, Result};
use std::time::Duration;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;
const SECONDS_PER_WEEK: u64 = 604_800;

/// Parse a Go-style duration string into a Rust `Duration`.
///
/// Supported units:
/// - `s` (seconds): "90s"
/// - `m` (minutes): "15m"
/// - `h` (hours): "24h"
/// - `d` (days): "7d"
/// - `w` (weeks): "1w"
///
/// # Examples
///
/// ```
/// use infrastructure_manager::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86400));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, a segment is missing its unit,
/// a value is not a non-negative integer, the unit is unknown, or the total
/// overflows.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let trimmed = duration_str.trim();
    if trimmed.is_empty() {
        bail!("Duration string cannot be empty");
    }

    let mut total: u64 = 0;
    let mut rest = trimmed;

    while !rest.is_empty() {
        let split_pos = rest
            .chars()
            .position(|c| !c.is_ascii_digit())
            .context("Duration must end with a unit (s, m, h, d, or w)")?;
        if split_pos == 0 {
            bail!("Duration '{duration_str}' has a unit without a value");
        }

        let (value_str, tail) = rest.split_at(split_pos);
        let unit_len = tail
            .chars()
            .position(|c| c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let value: u64 = value_str
            .parse()
            .context("Duration value must be a positive integer")?;

        let multiplier = match unit {
            "s" => 1,
            "m" => SECONDS_PER_MINUTE,
            "h" => SECONDS_PER_HOUR,
            "d" => SECONDS_PER_DAY,
            "w" => SECONDS_PER_WEEK,
            _ => bail!(
                "Unsupported duration unit '{unit}'. Use 's', 'm', 'h', 'd', or 'w'"
            ),
        };

        let seconds = value
            .checked_mul(multiplier)
            .context("Duration value too large (overflow)")?;
        total = total
            .checked_add(seconds)
            .context("Duration value too large (overflow)")?;
        rest = next;
    }

    Ok(Duration::from_secs(total))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
