//! Bar-size grammar for time bars.
//!
//! A duration is one or more `<integer><unit>` terms, e.g. `"30s"`, `"15m"`,
//! `"1h30m"`. Recognized units: `ns`, `us`, `ms`, `s`, `m`, `h`, `d`, `w`.

use crate::error::{Error, Result};
use crate::types::{TimestampNs, NANOS_PER_DAY, NANOS_PER_SECOND};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset of the first Monday (1970-01-05) from the Unix epoch.
const MONDAY_ANCHOR_NS: i64 = 4 * NANOS_PER_DAY;

/// A fixed wall-clock interval used to bucket time bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Every {
    text: String,
    nanos: i64,
    weekly: bool,
}

fn unit_nanos(unit: &str) -> Option<i64> {
    Some(match unit {
        "ns" => 1,
        "us" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => 60 * NANOS_PER_SECOND,
        "h" => 3_600 * NANOS_PER_SECOND,
        "d" => NANOS_PER_DAY,
        "w" => 7 * NANOS_PER_DAY,
        _ => return None,
    })
}

impl Every {
    /// Parse a duration such as `"5m"` or `"1h30m"`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::config("empty bar size"));
        }

        let mut total: i64 = 0;
        let mut only_weeks = true;
        let mut rest = trimmed;
        while !rest.is_empty() {
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| Error::config(format!("bar size '{text}' is missing a unit")))?;
            if digits_end == 0 {
                return Err(Error::config(format!("bar size '{text}' must start with an integer")));
            }
            let count: i64 = rest[..digits_end]
                .parse()
                .map_err(|_| Error::config(format!("bar size '{text}' is out of range")))?;

            let after = &rest[digits_end..];
            let unit_end = after
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(after.len());
            let unit = &after[..unit_end];
            let nanos = unit_nanos(unit)
                .ok_or_else(|| Error::config(format!("unknown bar size unit '{unit}' in '{text}'")))?;
            only_weeks &= unit == "w";

            total = count
                .checked_mul(nanos)
                .and_then(|n| total.checked_add(n))
                .ok_or_else(|| Error::config(format!("bar size '{text}' is out of range")))?;
            rest = &after[unit_end..];
        }

        if total <= 0 {
            return Err(Error::config(format!("bar size '{text}' must be positive")));
        }

        Ok(Self {
            text: trimmed.to_string(),
            nanos: total,
            weekly: only_weeks,
        })
    }

    /// Interval length in nanoseconds.
    #[inline]
    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    /// Truncate a timestamp to the start of its interval.
    ///
    /// Weekly intervals start on Monday 00:00; everything else is aligned to
    /// the Unix epoch.
    #[inline]
    pub fn truncate(&self, ts_ns: TimestampNs) -> TimestampNs {
        let anchor = if self.weekly { MONDAY_ANCHOR_NS } else { 0 };
        (ts_ns - anchor).div_euclid(self.nanos) * self.nanos + anchor
    }
}

impl FromStr for Every {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Every::parse(s)
    }
}

impl TryFrom<String> for Every {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Every::parse(&value)
    }
}

impl From<Every> for String {
    fn from(every: Every) -> Self {
        every.text
    }
}

impl fmt::Display for Every {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validate a count threshold (tick and volume bars).
pub fn positive_count(bar_size: u64) -> Result<u64> {
    if bar_size == 0 {
        return Err(Error::config("bar size must be a positive integer"));
    }
    Ok(bar_size)
}

/// Validate an amount threshold (dollar bars, generic metric grouping).
pub fn positive_amount(bar_size: f64) -> Result<f64> {
    if !bar_size.is_finite() || bar_size <= 0.0 {
        return Err(Error::config(format!("bar size must be positive, got {bar_size}")));
    }
    Ok(bar_size)
}
