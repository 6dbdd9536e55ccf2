//! Parsing of human-entered wait durations.
//!
//! The `--waitFor` flag takes an integer followed by a unit suffix:
//!
//! | Input | Milliseconds |
//! |-------|--------------|
//! | `200milli` | 200 |
//! | `5sec` | 5000 |
//! | `2min` | 120000 |
//!
//! A malformed value never aborts a run: [`wait_millis_or_default`] logs a
//! warning and falls back to [`DEFAULT_WAIT_MILLIS`].

use tracing::warn;

/// Wait time applied when `--waitFor` cannot be understood (`5sec`).
pub const DEFAULT_WAIT_MILLIS: u64 = 5_000;

/// Why a wait duration string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("no recognized unit suffix (expected milli, sec or min)")]
    MissingUnit,

    #[error("'{0}' is not a non-negative integer")]
    InvalidNumber(String),

    #[error("'{0}' overflows the millisecond range")]
    Overflow(String),
}

/// Unit suffixes accepted after the numeric prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUnit {
    Milli,
    Sec,
    Min,
}

impl WaitUnit {
    const ALL: [WaitUnit; 3] = [WaitUnit::Milli, WaitUnit::Sec, WaitUnit::Min];

    /// The literal suffix as typed on the command line.
    pub fn suffix(self) -> &'static str {
        match self {
            WaitUnit::Milli => "milli",
            WaitUnit::Sec => "sec",
            WaitUnit::Min => "min",
        }
    }

    /// Milliseconds per unit.
    pub fn millis_factor(self) -> u64 {
        match self {
            WaitUnit::Milli => 1,
            WaitUnit::Sec => 1_000,
            WaitUnit::Min => 60_000,
        }
    }

    /// Find the unit `input` ends with, returning it with the numeric prefix.
    fn split(input: &str) -> Option<(&str, WaitUnit)> {
        Self::ALL
            .iter()
            .find_map(|unit| input.strip_suffix(unit.suffix()).map(|prefix| (prefix, *unit)))
    }
}

/// Parse a wait duration such as `5sec` into milliseconds.
///
/// The prefix is read as a base-10 integer; signs, whitespace and other
/// bases are rejected.
pub fn parse_wait_millis(input: &str) -> Result<u64, DurationParseError> {
    let (prefix, unit) = WaitUnit::split(input).ok_or(DurationParseError::MissingUnit)?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationParseError::InvalidNumber(prefix.to_string()));
    }

    let value: u64 = prefix
        .parse()
        .map_err(|_| DurationParseError::Overflow(input.to_string()))?;

    value
        .checked_mul(unit.millis_factor())
        .ok_or_else(|| DurationParseError::Overflow(input.to_string()))
}

/// Parse a wait duration, substituting [`DEFAULT_WAIT_MILLIS`] on failure.
pub fn wait_millis_or_default(input: &str) -> u64 {
    match parse_wait_millis(input) {
        Ok(millis) => millis,
        Err(DurationParseError::MissingUnit) => {
            warn!("--waitFor format is wrong. Applying default 5sec");
            DEFAULT_WAIT_MILLIS
        }
        Err(e) => {
            warn!("Cannot parse --waitFor '{}' ({}). Applying default 5sec", input, e);
            DEFAULT_WAIT_MILLIS
        }
    }
}
