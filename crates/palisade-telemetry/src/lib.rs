//! # Palisade Telemetry
//!
//! Process-level observability wiring for applications using the Palisade
//! middleware and transport decorators: `tracing-subscriber` initialization
//! with dev/prod presets, and a Prometheus recorder for the `metrics`
//! facade the stages emit through.
//!
//! The middleware crates only ever talk to the `tracing` and `metrics`
//! facades; an application that prefers its own subscriber or recorder can
//! skip this crate entirely.
//!
//! # Example
//!
//! ```rust,ignore
//! use palisade_telemetry::{init_logging, init_metrics, LogConfig, MetricsConfig};
//!
//! init_logging(&LogConfig::production())?;
//! init_metrics(&MetricsConfig::default())?;
//! ```

#![doc(html_root_url = "https://docs.rs/palisade-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type alias using [`TelemetryError`].
pub type TelemetryResult<T> = Result<T, TelemetryError>;
