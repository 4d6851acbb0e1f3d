//! Client request logging decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use palisade_core::{Request, Response};
use std::sync::Arc;
use std::time::Instant;

/// Options for [`LoggingTransport`].
#[derive(Debug, Clone, Copy)]
pub struct LoggingTransportOptions {
    /// Statuses at or above this value are logged at `warn` level.
    pub warn_status_threshold: u16,
}

impl Default for LoggingTransportOptions {
    fn default() -> Self {
        Self {
            warn_status_threshold: 500,
        }
    }
}

/// Decorator logging one line per outbound round trip: method, URL,
/// status and latency.
///
/// Transport errors and statuses at or above the threshold are logged at
/// `warn`, everything else at `info`.
pub struct LoggingTransport {
    inner: Arc<dyn Transport>,
    options: LoggingTransportOptions,
}

impl LoggingTransport {
    /// Creates the decorator.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, options: LoggingTransportOptions) -> Self {
        Self { inner, options }
    }
}

impl Transport for LoggingTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        let method = request.method().clone();
        let url = request.uri().to_string();

        Box::pin(async move {
            let start = Instant::now();
            let result = self.inner.round_trip(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if status >= self.options.warn_status_threshold {
                        tracing::warn!(%method, url, status, elapsed_ms, "outbound request returned error status");
                    } else {
                        tracing::info!(%method, url, status, elapsed_ms, "outbound request completed");
                    }
                }
                Err(error) => {
                    tracing::warn!(%method, url, %error, elapsed_ms, "outbound request failed");
                }
            }
            result
        })
    }
}
