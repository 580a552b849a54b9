//! Ordered interval collections.
//!
//! [`SilenceLog`] holds the silent spans reported by the detector and
//! [`KeepSegmentList`] the spans retained in the output. Both are expected
//! to be sorted ascending by start with no two intervals overlapping.

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// True if `intervals` is sorted by start and pairwise non-overlapping.
fn is_sorted_disjoint(intervals: &[TimeInterval]) -> bool {
    intervals
        .windows(2)
        .all(|pair| pair[0].end() <= pair[1].start())
}

/// Silent spans in the order the detector reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SilenceLog(Vec<TimeInterval>);

impl SilenceLog {
    pub fn new(intervals: Vec<TimeInterval>) -> Self {
        Self(intervals)
    }

    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeInterval> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all silent span lengths in seconds.
    pub fn total_secs(&self) -> f64 {
        self.0.iter().map(TimeInterval::duration).sum()
    }

    /// Whether the log is ascending and free of overlaps.
    pub fn is_well_ordered(&self) -> bool {
        is_sorted_disjoint(&self.0)
    }
}

impl<'a> IntoIterator for &'a SilenceLog {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Spans of media time to retain, in output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeepSegmentList(Vec<TimeInterval>);

impl KeepSegmentList {
    pub fn new(segments: Vec<TimeInterval>) -> Self {
        Self(segments)
    }

    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeInterval> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all kept span lengths in seconds.
    pub fn total_secs(&self) -> f64 {
        self.0.iter().map(TimeInterval::duration).sum()
    }

    /// Whether the list is ascending and free of overlaps.
    pub fn is_well_ordered(&self) -> bool {
        is_sorted_disjoint(&self.0)
    }
}

impl<'a> IntoIterator for &'a KeepSegmentList {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Statistics about kept and removed media time for one trim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Seconds of media retained.
    pub kept_secs: f64,
    /// Seconds of media removed.
    pub removed_secs: f64,
    /// Number of keep segments.
    pub keep_count: usize,
    /// Number of silent spans detected.
    pub silence_count: usize,
    /// Ratio of kept content (0.0 to 1.0).
    pub keep_ratio: f64,
}

impl SegmentStats {
    /// Compute statistics for a keep list against the probed total duration.
    pub fn compute(keep: &KeepSegmentList, silences: &SilenceLog, total_duration: f64) -> Self {
        let kept_secs = keep.total_secs();
        let removed_secs = (total_duration - kept_secs).max(0.0);
        let keep_ratio = if total_duration > 0.0 {
            (kept_secs / total_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            kept_secs,
            removed_secs,
            keep_count: keep.len(),
            silence_count: silences.len(),
            keep_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: f64, end: f64) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    #[test]
    fn test_well_ordered() {
        let log = SilenceLog::new(vec![span(0.0, 1.0), span(1.0, 2.0), span(5.0, 6.0)]);
        assert!(log.is_well_ordered());

        let overlapping = SilenceLog::new(vec![span(0.0, 2.0), span(1.5, 3.0)]);
        assert!(!overlapping.is_well_ordered());

        let unsorted = KeepSegmentList::new(vec![span(4.0, 5.0), span(0.0, 1.0)]);
        assert!(!unsorted.is_well_ordered());
    }

    #[test]
    fn test_totals() {
        let log = SilenceLog::new(vec![span(2.0, 3.0), span(5.0, 7.5)]);
        assert!((log.total_secs() - 3.5).abs() < 1e-9);

        let keep = KeepSegmentList::new(vec![span(0.0, 2.0), span(3.0, 5.0), span(7.5, 10.0)]);
        assert!((keep.total_secs() - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_segment_stats() {
        let log = SilenceLog::new(vec![span(2.0, 3.0), span(5.0, 10.0)]);
        let keep = KeepSegmentList::new(vec![span(0.0, 2.0), span(3.0, 5.0)]);

        let stats = SegmentStats::compute(&keep, &log, 10.0);
        assert!((stats.kept_secs - 4.0).abs() < 1e-9);
        assert!((stats.removed_secs - 6.0).abs() < 1e-9);
        assert_eq!(stats.keep_count, 2);
        assert_eq!(stats.silence_count, 2);
        assert!((stats.keep_ratio - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_segment_stats_zero_duration() {
        let stats = SegmentStats::compute(&KeepSegmentList::default(), &SilenceLog::default(), 0.0);
        assert_eq!(stats.keep_count, 0);
        assert!((stats.keep_ratio - 1.0).abs() < f64::EPSILON);
    }
}
