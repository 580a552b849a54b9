#![deny(unreachable_patterns)]
//! FFmpeg-driven silence removal.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building for the detect, probe and render passes
//! - Process invocation behind the [`EngineInvoker`] seam, with timeouts
//! - Progress parsing from `-progress pipe:2`
//! - Parsing of `silencedetect` markers into silence intervals
//! - Keep-segment construction and trim/concat filter graph compilation
//! - The [`SilenceTrimmer`] pipeline tying it all together
//!
//! ```no_run
//! use std::path::Path;
//! use silencecut_media::{SilenceTrimmer, TrimConfig};
//!
//! # async fn run() -> silencecut_media::MediaResult<()> {
//! let trimmer = SilenceTrimmer::from_config(TrimConfig::from_env())?;
//! let outcome = trimmer
//!     .trim(Path::new("talk.mp4"), Path::new("talk.trimmed.mp4"))
//!     .await?;
//! println!("removed {:.1}s", outcome.stats.removed_secs);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod filter_graph;
pub mod invoker;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod progress;
pub mod silence;
pub mod trim;

pub use command::FfmpegCommand;
pub use config::{load_dotenv, TrimConfig};
pub use error::{MediaError, MediaResult};
pub use filter_graph::{compile_filter_graph, GraphProgram};
pub use invoker::{EngineInvoker, EngineOutput, FfmpegInvoker, ProgressSink};
pub use logging::{init_tracing, LogFormat};
pub use probe::{parse_duration, probe_duration};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use silence::{build_keep_segments, parse_silence_log, SilenceDetectConfig, SilenceLogParser};
pub use trim::{SilenceTrimmer, TrimOutcome};

pub use silencecut_models::{KeepSegmentList, SegmentStats, SilenceLog, TimeInterval};
