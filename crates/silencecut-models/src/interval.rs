//! A closed span of media time in seconds.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing a [`TimeInterval`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntervalError {
    #[error("interval bound is not a finite number: start={start}, end={end}")]
    NotFinite { start: f64, end: f64 },

    #[error("interval start {start} is after end {end}")]
    Inverted { start: f64, end: f64 },
}

/// A time span `{start, end}` in seconds with `start <= end`.
///
/// Used both for silent spans reported by the detector and for the spans
/// kept in the rendered output. Fields are private so the ordering
/// invariant cannot be broken after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct TimeInterval {
    start: f64,
    end: f64,
}

impl TimeInterval {
    /// Create an interval, rejecting inverted or non-finite bounds.
    pub fn new(start: f64, end: f64) -> Result<Self, IntervalError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(IntervalError::NotFinite { start, end });
        }
        if start > end {
            return Err(IntervalError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Start time in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the span in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True if the two spans share more than a boundary point.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s]", self.start, self.end)
    }
}

#[derive(Serialize, Deserialize)]
struct RawInterval {
    start: f64,
    end: f64,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl From<TimeInterval> for RawInterval {
    fn from(interval: TimeInterval) -> Self {
        RawInterval {
            start: interval.start,
            end: interval.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let interval = TimeInterval::new(1.5, 4.0).unwrap();
        assert_eq!(interval.start(), 1.5);
        assert_eq!(interval.end(), 4.0);
        assert!((interval.duration() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_length_allowed() {
        let interval = TimeInterval::new(3.0, 3.0).unwrap();
        assert_eq!(interval.duration(), 0.0);
    }

    #[test]
    fn test_inverted_rejected() {
        assert!(matches!(
            TimeInterval::new(5.0, 2.0),
            Err(IntervalError::Inverted { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            TimeInterval::new(f64::NAN, 2.0),
            Err(IntervalError::NotFinite { .. })
        ));
        assert!(matches!(
            TimeInterval::new(0.0, f64::INFINITY),
            Err(IntervalError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_overlaps() {
        let a = TimeInterval::new(0.0, 2.0).unwrap();
        let b = TimeInterval::new(1.0, 3.0).unwrap();
        let c = TimeInterval::new(2.0, 4.0).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&c));
        // Touching at a boundary is not an overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_serde_validates() {
        let interval: TimeInterval = serde_json::from_str(r#"{"start":1.5,"end":3.0}"#).unwrap();
        assert_eq!(interval, TimeInterval::new(1.5, 3.0).unwrap());
        assert_eq!(
            serde_json::to_string(&interval).unwrap(),
            r#"{"start":1.5,"end":3.0}"#
        );

        let inverted = serde_json::from_str::<TimeInterval>(r#"{"start":3.0,"end":1.0}"#);
        assert!(inverted.is_err());
    }

    #[test]
    fn test_display() {
        let interval = TimeInterval::new(1.0, 2.25).unwrap();
        assert_eq!(interval.to_string(), "[1.000s, 2.250s]");
    }
}
