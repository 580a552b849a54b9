//! Configuration for FFmpeg's `silencedetect` filter.
//!
//! These parameters control how quiet a span must be, and for how long,
//! before the detector reports it as silence.

use serde::{Deserialize, Serialize};

/// Loudest level that is still allowed to count as silence.
const MAX_NOISE_DB: f64 = 0.0;

/// Shortest span the detector is asked to report.
const MIN_SILENCE_FLOOR_SECS: f64 = 0.01;

/// Configuration for silence detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceDetectConfig {
    /// Noise threshold in decibels (negative).
    ///
    /// - Lower values (-70 dB): only near-digital silence is cut
    /// - Default (-60 dB): room tone and hiss count as silence
    /// - Higher values (-35 dB): quiet speech may be cut too
    pub noise_db: f64,

    /// Minimum silence duration in seconds.
    ///
    /// Shorter pauses are left alone. This is the gap tolerance applied by
    /// the detector itself; the keep-segment builder does no further
    /// filtering.
    pub min_silence_secs: f64,
}

impl Default for SilenceDetectConfig {
    fn default() -> Self {
        Self {
            noise_db: -60.0,
            min_silence_secs: 0.5,
        }
    }
}

impl SilenceDetectConfig {
    /// Cut more: louder threshold, shorter pauses.
    pub fn aggressive() -> Self {
        Self {
            noise_db: -40.0,
            min_silence_secs: 0.3,
        }
    }

    /// Cut less: only long, very quiet spans.
    pub fn conservative() -> Self {
        Self {
            noise_db: -70.0,
            min_silence_secs: 1.5,
        }
    }

    /// Builder-style setter for the noise threshold.
    pub fn with_noise_db(mut self, noise_db: f64) -> Self {
        self.noise_db = noise_db.min(MAX_NOISE_DB);
        self
    }

    /// Builder-style setter for the minimum silence duration.
    pub fn with_min_silence_secs(mut self, secs: f64) -> Self {
        self.min_silence_secs = secs.max(MIN_SILENCE_FLOOR_SECS);
        self
    }

    /// Render the `-af` argument for the detection pass.
    pub fn filter_arg(&self) -> String {
        format!(
            "silencedetect=noise={}dB:d={}",
            self.noise_db, self.min_silence_secs
        )
    }
}
