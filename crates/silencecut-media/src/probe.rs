//! Media duration from FFmpeg's input description.
//!
//! FFmpeg prints a header for every input it opens:
//!
//! ```text
//! Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'talk.mp4':
//!   Duration: 00:02:07.36, start: 0.000000, bitrate: 1205 kb/s
//! ```
//!
//! The detection pass already contains this header, so the orchestrator
//! can usually read the duration from it without a second invocation.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use silencecut_models::parse_timestamp;
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::invoker::EngineInvoker;

static DURATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration:\s*(\d+:\d{1,2}:\d{1,2}(?:\.\d+)?)").unwrap());

/// Extract the total duration in seconds from FFmpeg's textual output.
///
/// Scans lines in order and uses the first `Duration: HH:MM:SS.ss` match.
/// `Duration: N/A` (live streams, some raw formats) does not match and
/// yields [`MediaError::DurationUnavailable`].
pub fn parse_duration(output: &str) -> MediaResult<f64> {
    let clock = output
        .lines()
        .find_map(|line| DURATION_LINE.captures(line))
        .map(|cap| cap[1].to_string())
        .ok_or(MediaError::DurationUnavailable)?;

    let seconds = parse_timestamp(&clock)?;
    debug!(clock = %clock, seconds, "Parsed media duration");
    Ok(seconds)
}

/// Run a dedicated probe invocation and parse the duration from it.
///
/// `ffmpeg -i <input>` with no output always exits non-zero, so the
/// exit status is ignored and only stderr is inspected.
pub async fn probe_duration<I>(invoker: &I, input: &Path) -> MediaResult<f64>
where
    I: EngineInvoker + ?Sized,
{
    let args = FfmpegCommand::probe(input).build_args();
    let output = invoker.invoke(&args).await?;
    parse_duration(&output.stderr)
}
