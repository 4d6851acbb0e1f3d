//! Structured logging initialization.
//!
//! Sets up `tracing-subscriber` for the structured events the middleware
//! stages and transport decorators emit. JSON output is the default; the
//! development preset switches to a pretty human-readable format with more
//! context.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled at all.
    pub enabled: bool,

    /// Filter directive, e.g. `"info"` or `"palisade=debug,info"`.
    pub level: String,

    /// JSON output when `true`, pretty human-readable output otherwise.
    pub json_format: bool,

    /// Whether span enter/close events are emitted.
    pub span_events: bool,

    /// Whether file and line numbers are included.
    pub file_line_info: bool,

    /// Whether the module path target is included.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Human-readable debug output for local development.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            include_target: true,
        }
    }

    /// JSON output at `info` for production.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

/// Installs the global tracing subscriber according to `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] when the filter directive is
/// invalid or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid filter directive: {e}")))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);
        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);
        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Field names used across the collection's structured log events.
pub mod fields {
    /// Correlation ID of the request being processed.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method.
    pub const METHOD: &str = "method";

    /// Request path.
    pub const PATH: &str = "path";

    /// Response status code.
    pub const STATUS: &str = "status";

    /// Wall time spent on the request, in milliseconds.
    pub const ELAPSED_MS: &str = "elapsed_ms";

    /// Name of a circuit-breaking gate.
    pub const BREAKER: &str = "breaker";

    /// Gate state after a transition.
    pub const BREAKER_STATE: &str = "to";
}
