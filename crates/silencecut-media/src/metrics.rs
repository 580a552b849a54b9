//! Trim metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the embedding application. Without one, every call is a no-op.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const TRIMS_STARTED_TOTAL: &str = "silencecut_trims_started_total";
    pub const TRIMS_COMPLETED_TOTAL: &str = "silencecut_trims_completed_total";
    pub const TRIMS_FAILED_TOTAL: &str = "silencecut_trims_failed_total";

    pub const ENGINE_DURATION_SECONDS: &str = "silencecut_engine_duration_seconds";
    pub const REMOVED_SECONDS: &str = "silencecut_removed_seconds";
}

/// Engine pass, used as the `pass` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePass {
    Detect,
    Probe,
    Render,
}

impl EnginePass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Probe => "probe",
            Self::Render => "render",
        }
    }
}

pub fn record_trim_started() {
    counter!(names::TRIMS_STARTED_TOTAL).increment(1);
}

/// Record a completed trim and how much time it cut.
pub fn record_trim_completed(removed_secs: f64) {
    counter!(names::TRIMS_COMPLETED_TOTAL).increment(1);
    histogram!(names::REMOVED_SECONDS).record(removed_secs);
}

/// Record a failed trim, labelled by error kind.
pub fn record_trim_failed(reason: &'static str) {
    let labels = [("reason", reason)];
    counter!(names::TRIMS_FAILED_TOTAL, &labels).increment(1);
}

/// Record wall-clock time of one engine invocation.
pub fn record_engine_duration(pass: EnginePass, duration_secs: f64) {
    let labels = [("pass", pass.as_str())];
    histogram!(names::ENGINE_DURATION_SECONDS, &labels).record(duration_secs);
}
