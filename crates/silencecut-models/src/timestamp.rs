//! Clock timestamp parsing and formatting.
//!
//! FFmpeg reports container durations as `HH:MM:SS.ss`. This module turns
//! those clock values into seconds and back, accepting the shorter `MM:SS`
//! and `SS` forms as well.

use std::fmt;

use thiserror::Error;

/// A field of a clock value, counted from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockField {
    Hours,
    Minutes,
    Seconds,
}

impl ClockField {
    /// Fields in right-to-left order with their weight in seconds.
    const FROM_RIGHT: [(ClockField, f64); 3] = [
        (ClockField::Seconds, 1.0),
        (ClockField::Minutes, 60.0),
        (ClockField::Hours, 3600.0),
    ];
}

impl fmt::Display for ClockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClockField::Hours => "hours",
            ClockField::Minutes => "minutes",
            ClockField::Seconds => "seconds",
        })
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("{field} field is negative in '{input}'")]
    Negative { field: ClockField, input: String },

    #[error("{field} field '{value}' is not a number")]
    NotANumber { field: ClockField, value: String },

    #[error("'{0}' has more than three clock fields; expected HH:MM:SS, MM:SS or SS")]
    TooManyFields(String),
}

/// Parse a clock value into total seconds.
///
/// Fields are read from the right, so `SS`, `MM:SS` and `HH:MM:SS` are all
/// accepted, each optionally with a fractional seconds part.
///
/// # Examples
/// ```
/// use silencecut_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("00:00:12.50").unwrap(), 12.5);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(input: &str) -> Result<f64, TimestampError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TimestampError::Empty);
    }

    let fields: Vec<&str> = input.rsplit(':').collect();
    if fields.len() > ClockField::FROM_RIGHT.len() {
        return Err(TimestampError::TooManyFields(input.to_string()));
    }

    fields
        .iter()
        .zip(ClockField::FROM_RIGHT)
        .try_fold(0.0, |total, (raw, (field, weight))| -> Result<f64, TimestampError> {
            let value = field_value(field, raw, input)?;
            Ok(total + value * weight)
        })
}

fn field_value(field: ClockField, raw: &str, input: &str) -> Result<f64, TimestampError> {
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TimestampError::NotANumber {
            field,
            value: raw.to_string(),
        })?;

    if value < 0.0 {
        return Err(TimestampError::Negative {
            field,
            input: input.to_string(),
        });
    }
    Ok(value)
}

/// Format seconds as `HH:MM:SS`, with milliseconds when not whole.
///
/// Negative input is clamped to zero.
pub fn format_seconds(total_secs: f64) -> String {
    let total_ms = (total_secs.max(0.0) * 1000.0).round() as u64;
    let (hours, rest) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (secs, millis) = (rest / 1000, rest % 1000);

    if millis == 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
    }
}
