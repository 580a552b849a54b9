//! State machine turning `silencedetect` output into silent intervals.
//!
//! FFmpeg writes one marker per line, interleaved with unrelated
//! diagnostics:
//!
//! ```text
//! [silencedetect @ 0x55d0c8] silence_start: 2.00206
//! [silencedetect @ 0x55d0c8] silence_end: 3.50794 | silence_duration: 1.50588
//! ```
//!
//! # State Machine
//!
//! ```text
//!                  silence_start: T (pending = T)
//!     ┌────────────────────────────────────────────────┐
//!     │                                                ▼
//! ┌────────┐                                     ┌───────────┐
//! │  Idle  │                                     │ InSilence │──┐ silence_start: T
//! └────────┘                                     └───────────┘◄─┘ (pending overwritten)
//!     ▲    silence_end: T (emit [pending, T])          │
//!     └────────────────────────────────────────────────┘
//! ```
//!
//! An end marker seen while Idle is ignored. A start still pending when
//! input runs out is dropped.

use std::sync::LazyLock;

use regex::Regex;
use silencecut_models::{SilenceLog, TimeInterval};
use tracing::{debug, trace};

const NUMBER: &str = r"(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)";

static SILENCE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"silence_start:\s*{NUMBER}")).unwrap());

static SILENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"silence_end:\s*{NUMBER}")).unwrap());

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// No silence open.
    Idle,
    /// A start marker was seen and no end has matched it yet.
    InSilence { pending_start: f64 },
}

/// Incremental parser for the detector's diagnostic text.
///
/// Feed lines with [`feed_line`](Self::feed_line) and collect the result
/// with [`finish`](Self::finish), or use [`parse_silence_log`] for a whole
/// text blob.
#[derive(Debug)]
pub struct SilenceLogParser {
    state: State,
    intervals: Vec<TimeInterval>,
}

impl Default for SilenceLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SilenceLogParser {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            intervals: Vec::new(),
        }
    }

    /// Process one line of detector output.
    pub fn feed_line(&mut self, line: &str) {
        if let Some(start) = capture_seconds(&SILENCE_START, line) {
            if let State::InSilence { pending_start } = self.state {
                debug!(
                    previous = pending_start,
                    replacement = start,
                    "Second silence_start before silence_end, overwriting pending start"
                );
            }
            self.state = State::InSilence {
                pending_start: start,
            };
            return;
        }

        let Some(end) = capture_seconds(&SILENCE_END, line) else {
            return;
        };

        match self.state {
            State::InSilence { pending_start } => {
                match TimeInterval::new(pending_start, end) {
                    Ok(interval) => {
                        trace!(%interval, "Silence detected");
                        self.intervals.push(interval);
                    }
                    Err(e) => debug!(error = %e, "Dropping malformed silence interval"),
                }
                self.state = State::Idle;
            }
            State::Idle => {
                trace!(end, "silence_end without pending start, ignoring");
            }
        }
    }

    /// Number of complete intervals parsed so far.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Finish parsing, discarding any start left without an end.
    pub fn finish(self) -> SilenceLog {
        if let State::InSilence { pending_start } = self.state {
            debug!(
                pending_start,
                "Detector output ended inside a silence, dropping dangling start"
            );
        }
        SilenceLog::new(self.intervals)
    }
}

/// Parse a complete block of detector output.
pub fn parse_silence_log(text: &str) -> SilenceLog {
    let mut parser = SilenceLogParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

fn capture_seconds(pattern: &Regex, line: &str) -> Option<f64> {
    pattern
        .captures(line)
        .and_then(|cap| cap[1].parse::<f64>().ok())
        .filter(|secs| secs.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(log: &SilenceLog) -> Vec<(f64, f64)> {
        log.iter().map(|i| (i.start(), i.end())).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_silence_log("").is_empty());
    }

    #[test]
    fn test_real_ffmpeg_output() {
        let text = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'talk.mp4':
  Duration: 00:00:12.48, start: 0.000000, bitrate: 1205 kb/s
Stream mapping:
  Stream #0:1 -> #0:0 (aac (native) -> pcm_s16le (native))
[silencedetect @ 0x55d0c8a1f2c0] silence_start: 2.00206
[silencedetect @ 0x55d0c8a1f2c0] silence_end: 3.50794 | silence_duration: 1.50588
size=N/A time=00:00:05.12 bitrate=N/A speed= 512x
[silencedetect @ 0x55d0c8a1f2c0] silence_start: 7.25
[silencedetect @ 0x55d0c8a1f2c0] silence_end: 9 | silence_duration: 1.75
";
        let log = parse_silence_log(text);
        assert_eq!(pairs(&log), vec![(2.00206, 3.50794), (7.25, 9.0)]);
        assert!(log.is_well_ordered());
    }

    #[test]
    fn test_double_start_overwrites_pending() {
        let log = parse_silence_log("silence_start: 1.0\nsilence_start: 2.0\nsilence_end: 3.0\n");
        assert_eq!(pairs(&log), vec![(2.0, 3.0)]);
    }

    #[test]
    fn test_dangling_start_dropped() {
        let log = parse_silence_log(
            "silence_start: 1.0\nsilence_end: 2.0\nsome other line\nsilence_start: 9.0\n",
        );
        assert_eq!(pairs(&log), vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_end_without_start_ignored() {
        let log = parse_silence_log("silence_end: 1.0\nsilence_start: 2.0\nsilence_end: 4.0\n");
        assert_eq!(pairs(&log), vec![(2.0, 4.0)]);
    }

    #[test]
    fn test_second_end_ignored() {
        let log = parse_silence_log("silence_start: 2.0\nsilence_end: 4.0\nsilence_end: 5.0\n");
        assert_eq!(pairs(&log), vec![(2.0, 4.0)]);
    }

    #[test]
    fn test_negative_and_exponent_timestamps() {
        let log = parse_silence_log(
            "[silencedetect @ 0x1] silence_start: -0.00133333\n\
             [silencedetect @ 0x1] silence_end: 1.5e0 | silence_duration: 1.50133\n",
        );
        assert_eq!(pairs(&log), vec![(-0.00133333, 1.5)]);
    }

    #[test]
    fn test_inverted_pair_dropped() {
        let log = parse_silence_log("silence_start: 5.0\nsilence_end: 4.0\nsilence_start: 6.0\nsilence_end: 7.0\n");
        assert_eq!(pairs(&log), vec![(6.0, 7.0)]);
    }

    #[test]
    fn test_incremental_feed() {
        let mut parser = SilenceLogParser::new();
        parser.feed_line("silence_start: 0");
        assert_eq!(parser.interval_count(), 0);
        parser.feed_line("silence_end: 1.25 | silence_duration: 1.25");
        assert_eq!(parser.interval_count(), 1);
        parser.feed_line("silence_start: 3");

        let log = parser.finish();
        assert_eq!(pairs(&log), vec![(0.0, 1.25)]);
    }

    #[test]
    fn test_unrelated_numbers_ignored() {
        let log = parse_silence_log("time=00:00:01.00 bitrate=1.5\nsilence_duration: 3.0\n");
        assert!(log.is_empty());
    }
}
