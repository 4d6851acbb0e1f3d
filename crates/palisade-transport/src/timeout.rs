//! Round-trip deadline decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use palisade_core::{Request, Response};
use std::sync::Arc;
use std::time::Duration;

/// Decorator bounding each round trip with a deadline.
///
/// On expiry the in-flight call is dropped and
/// [`TransportError::Timeout`] is returned.
pub struct TimeoutTransport {
    inner: Arc<dyn Transport>,
    deadline: Duration,
}

impl TimeoutTransport {
    /// Creates the decorator with the given per-request deadline.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

impl Transport for TimeoutTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(async move {
            match tokio::time::timeout(self.deadline, self.inner.round_trip(request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout {
                    deadline: self.deadline,
                }),
            }
        })
    }
}
