//! Shared data models for silencecut.
//!
//! This crate provides Serde-serializable value types for:
//! - Time intervals (silent spans and keep spans)
//! - Silence logs and keep-segment lists with their ordering invariants
//! - Timestamp parsing and formatting for `HH:MM:SS.ss` clock values

pub mod interval;
pub mod segments;
pub mod timestamp;

// Re-export common types
pub use interval::{IntervalError, TimeInterval};
pub use segments::{KeepSegmentList, SegmentStats, SilenceLog};
pub use timestamp::{format_seconds, parse_timestamp, ClockField, TimestampError};
