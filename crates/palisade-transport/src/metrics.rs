//! Client metrics decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use http_body::Body;
use palisade_core::{Request, Response};
use std::sync::Arc;
use std::time::Instant;

/// Decorator recording per-client request metrics through the `metrics`
/// facade:
///
/// - `palisade_client_requests_total{client, method, status}`
/// - `palisade_client_errors_total{client, method}`
/// - `palisade_client_request_duration_seconds{client, method}`
/// - `palisade_client_request_size_bytes{client, method}`
/// - `palisade_client_response_size_bytes{client, method}`
///
/// `client` is the logical downstream name given at construction, so one
/// process talking to several services keeps their series apart.
pub struct MetricsTransport {
    inner: Arc<dyn Transport>,
    client: String,
}

impl MetricsTransport {
    /// Creates the decorator for the named downstream client.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, client: impl Into<String>) -> Self {
        Self {
            inner,
            client: client.into(),
        }
    }
}

impl Transport for MetricsTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        let method = request.method().to_string();
        let request_size = request.body().size_hint().exact().unwrap_or(0);

        Box::pin(async move {
            let start = Instant::now();
            let result = self.inner.round_trip(request).await;
            let elapsed = start.elapsed();

            metrics::histogram!(
                "palisade_client_request_duration_seconds",
                "client" => self.client.clone(),
                "method" => method.clone()
            )
            .record(elapsed.as_secs_f64());
            metrics::histogram!(
                "palisade_client_request_size_bytes",
                "client" => self.client.clone(),
                "method" => method.clone()
            )
            .record(request_size as f64);

            match &result {
                Ok(response) => {
                    metrics::counter!(
                        "palisade_client_requests_total",
                        "client" => self.client.clone(),
                        "method" => method.clone(),
                        "status" => response.status().as_u16().to_string()
                    )
                    .increment(1);
                    let response_size = response.body().size_hint().exact().unwrap_or(0);
                    metrics::histogram!(
                        "palisade_client_response_size_bytes",
                        "client" => self.client.clone(),
                        "method" => method
                    )
                    .record(response_size as f64);
                }
                Err(_) => {
                    metrics::counter!(
                        "palisade_client_errors_total",
                        "client" => self.client.clone(),
                        "method" => method
                    )
                    .increment(1);
                }
            }
            result
        })
    }
}
