//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default directive when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "silencecut=info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON, anything else the human format.
    pub fn from_env() -> Self {
        let use_json = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        if use_json {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is left in place.
pub fn init_tracing(format: LogFormat) -> bool {
    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter())
            .try_init(),
    };

    result.is_ok()
}
