//! Complement of a silence log within `[0, total_duration]`.
//!
//! A single forward pass with a cursor: everything between the cursor and
//! the next silence start is kept, then the cursor jumps to that silence's
//! end. Whatever remains after the last silence becomes a trailing segment.

use silencecut_models::{KeepSegmentList, SilenceLog, TimeInterval};

/// Compute the spans that are not silent.
///
/// `silences` must be ascending and disjoint, as produced by the parser.
/// A silence starting at or before the cursor (leading silence at `0.0`,
/// or malformed overlapping input) emits nothing and only advances the
/// cursor, so no negative-length segment is ever produced. Returns an
/// empty list when the silences cover the whole duration.
pub fn build_keep_segments(silences: &SilenceLog, total_duration: f64) -> KeepSegmentList {
    let mut segments = Vec::with_capacity(silences.len() + 1);
    let mut cursor = 0.0_f64;

    for silence in silences {
        if silence.start() > cursor {
            segments.extend(TimeInterval::new(cursor, silence.start()).ok());
        }
        // Never move backwards on overlapping input
        cursor = cursor.max(silence.end());
    }

    if cursor < total_duration {
        segments.extend(TimeInterval::new(cursor, total_duration).ok());
    }

    KeepSegmentList::new(segments)
}
