//! Telemetry error types.

use thiserror::Error;

/// Errors surfaced while wiring up logging or metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Failed to initialize metrics.
    #[error("failed to initialize metrics: {0}")]
    MetricsInit(String),

    /// The metrics listen address could not be parsed.
    #[error("invalid metrics address: {0}")]
    InvalidAddress(String),
}
