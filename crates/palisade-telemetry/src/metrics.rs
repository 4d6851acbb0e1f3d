//! Prometheus metrics initialization.
//!
//! Installs a `metrics-exporter-prometheus` recorder behind the `metrics`
//! facade and registers descriptions for the series the collection emits.
//!
//! # Standard series
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `palisade_requests_total` | counter | `method`, `path`, `status` |
//! | `palisade_request_duration_seconds` | histogram | `method`, `path` |
//! | `palisade_client_requests_total` | counter | `client`, `method`, `status` |
//! | `palisade_client_errors_total` | counter | `client`, `method` |
//! | `palisade_client_request_duration_seconds` | histogram | `client`, `method` |
//! | `palisade_client_request_size_bytes` | histogram | `client`, `method` |
//! | `palisade_client_response_size_bytes` | histogram | `client`, `method` |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether the recorder is installed at all.
    pub enabled: bool,

    /// Address the Prometheus scrape endpoint listens on.
    pub addr: String,

    /// Histogram buckets for the duration series.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder according to `config`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the listen address does not parse or a
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .with_http_listener(addr)
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();
    Ok(())
}

/// Renders the current metrics in Prometheus text format, or `None` when
/// the recorder was never installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "palisade_requests_total",
        "Inbound HTTP requests processed through the middleware pipeline"
    );
    describe_histogram!(
        "palisade_request_duration_seconds",
        "Inbound HTTP request duration in seconds"
    );
    describe_counter!(
        "palisade_client_requests_total",
        "Outbound HTTP round trips completed, by downstream client"
    );
    describe_counter!(
        "palisade_client_errors_total",
        "Outbound HTTP round trips that failed in transport"
    );
    describe_histogram!(
        "palisade_client_request_duration_seconds",
        "Outbound HTTP round-trip duration in seconds"
    );
    describe_histogram!(
        "palisade_client_request_size_bytes",
        "Outbound HTTP request body size in bytes"
    );
    describe_histogram!(
        "palisade_client_response_size_bytes",
        "Outbound HTTP response body size in bytes"
    );
}
