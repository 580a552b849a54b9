//! Silence detection and keep-segment construction.
//!
//! FFmpeg's `silencedetect` filter reports silent spans as free-text markers
//! on stderr. This module turns that text into a [`SilenceLog`] and then into
//! the complementary [`KeepSegmentList`] that the render pass retains.
//!
//! [`SilenceLog`]: silencecut_models::SilenceLog
//! [`KeepSegmentList`]: silencecut_models::KeepSegmentList

mod config;
mod parser;
mod segmenter;

pub use config::SilenceDetectConfig;
pub use parser::{parse_silence_log, SilenceLogParser};
pub use segmenter::build_keep_segments;
