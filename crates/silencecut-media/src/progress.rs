//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg's `-progress` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).clamp(0.0, 100.0)
    }

    /// Estimate time remaining in seconds.
    pub fn eta_seconds(&self, total_duration_ms: i64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }

        let remaining_ms = total_duration_ms - self.out_time_ms;
        if remaining_ms <= 0 {
            return Some(0.0);
        }

        // Time remaining = remaining duration / speed
        Some((remaining_ms as f64 / 1000.0) / self.speed)
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(FfmpegProgress) + Send + Sync + 'static>;

/// Whether `line` looks like a `-progress` key/value line.
///
/// Keys are lowercase identifiers and the whole line carries no
/// whitespace, which diagnostic messages practically always do.
pub fn is_progress_line(line: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some((key, _)) = line.split_once('=') else {
        return false;
    };

    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        && !line.contains(char::is_whitespace)
}

/// Fold one `key=value` progress line into `current`.
///
/// FFmpeg emits a block of keys terminated by `progress=continue` or
/// `progress=end`; a snapshot is returned only at that terminator.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        // out_time_ms is mislabeled by FFmpeg and actually carries microseconds
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "speed" => {
            // Format: "1.5x" or "N/A"
            if let Some(speed) = value
                .trim()
                .strip_suffix('x')
                .and_then(|s| s.parse().ok())
            {
                current.speed = speed;
            }
        }
        "progress" => {
            current.is_complete = value == "end";
            return Some(current.clone());
        }
        _ => {}
    }

    None
}
