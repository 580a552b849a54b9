//! Trim configuration.

use serde::{Deserialize, Serialize};

use crate::silence::SilenceDetectConfig;

/// Segment count above which the graph is passed as a script file.
pub const DEFAULT_MAX_INLINE_SEGMENTS: usize = 100;

/// Configuration for a trim operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimConfig {
    /// FFmpeg binary, a bare name resolved through PATH or a full path
    pub ffmpeg_path: String,
    /// Detector parameters
    pub detect: SilenceDetectConfig,
    /// Per-invocation timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Longest graph passed inline on the command line, in keep segments
    pub max_inline_segments: usize,
    /// Video codec for the render pass (engine default when unset)
    pub video_codec: Option<String>,
    /// Audio codec for the render pass (engine default when unset)
    pub audio_codec: Option<String>,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            detect: SilenceDetectConfig::default(),
            timeout_secs: None,
            max_inline_segments: DEFAULT_MAX_INLINE_SEGMENTS,
            video_codec: None,
            audio_codec: None,
        }
    }
}

impl TrimConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let detect = SilenceDetectConfig::default()
            .with_noise_db(
                std::env::var("SILENCECUT_NOISE_DB")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.detect.noise_db),
            )
            .with_min_silence_secs(
                std::env::var("SILENCECUT_MIN_SILENCE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.detect.min_silence_secs),
            );

        Self {
            ffmpeg_path: std::env::var("SILENCECUT_FFMPEG").unwrap_or(defaults.ffmpeg_path),
            detect,
            timeout_secs: std::env::var("SILENCECUT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&secs: &u64| secs > 0),
            max_inline_segments: std::env::var("SILENCECUT_MAX_INLINE_SEGMENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_inline_segments),
            video_codec: non_empty_var("SILENCECUT_VIDEO_CODEC"),
            audio_codec: non_empty_var("SILENCECUT_AUDIO_CODEC"),
        }
    }

    /// Builder-style setter for detector parameters.
    pub fn with_detect(mut self, detect: SilenceDetectConfig) -> Self {
        self.detect = detect;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_max_inline_segments(mut self, segments: usize) -> Self {
        self.max_inline_segments = segments;
        self
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }
}

/// Load a `.env` file from the working directory or its parents, if any.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
