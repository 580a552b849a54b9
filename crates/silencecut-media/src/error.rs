//! Error types for media operations.

use std::path::PathBuf;

use silencecut_models::{IntervalError, TimestampError};
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while detecting and removing silence.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(String),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Media duration not found in FFmpeg output")]
    DurationUnavailable,

    #[error("Nothing left to keep: all {duration:.3}s of input classified as silent")]
    NoRetainableContent { duration: f64 },

    #[error("Render failed with exit code {}", display_code(.exit_code))]
    RenderFailed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid output path: {0}")]
    InvalidOutput(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    #[error("Invalid interval: {0}")]
    InvalidInterval(#[from] IntervalError),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a render failure error, keeping only the tail of stderr.
    pub fn render_failed(exit_code: Option<i32>, stderr: &str) -> Self {
        Self::RenderFailed {
            exit_code,
            stderr: stderr_tail(stderr),
        }
    }

    /// Short label used for failure metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FfmpegNotFound(_) => "ffmpeg_not_found",
            Self::FfmpegFailed { .. } => "ffmpeg_failed",
            Self::DurationUnavailable => "duration_unavailable",
            Self::NoRetainableContent { .. } => "no_retainable_content",
            Self::RenderFailed { .. } => "render_failed",
            Self::FileNotFound(_) => "file_not_found",
            Self::InvalidOutput(_) => "invalid_output",
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
            Self::InvalidTimestamp(_) => "invalid_timestamp",
            Self::InvalidInterval(_) => "invalid_interval",
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Last few non-empty lines of engine stderr, for diagnostics.
pub(crate) fn stderr_tail(stderr: &str) -> Option<String> {
    const TAIL_LINES: usize = 5;

    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(TAIL_LINES);
    Some(lines[start..].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_failed_message() {
        let err = MediaError::render_failed(Some(1), "frame=  10\nError while filtering\n");
        assert_eq!(err.to_string(), "Render failed with exit code 1");
        assert_eq!(err.kind(), "render_failed");

        match err {
            MediaError::RenderFailed { exit_code, stderr } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.as_deref(), Some("frame=  10\nError while filtering"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_render_failed_without_code() {
        let err = MediaError::render_failed(None, "");
        assert_eq!(err.to_string(), "Render failed with exit code none");
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr = (1..=8).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = stderr_tail(&stderr).unwrap();
        assert_eq!(tail, "line 4\nline 5\nline 6\nline 7\nline 8");
    }
}
