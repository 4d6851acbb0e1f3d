//! Request-id propagation decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use palisade_core::{header, Request, RequestId, Response};
use std::sync::Arc;

/// Decorator stamping `X-Request-Id` on outgoing requests.
///
/// The inbound pipeline stores its [`RequestId`] in the outgoing request's
/// extensions; this decorator turns it into the propagation header so the
/// downstream service joins the same trace. A request without an extension
/// keeps an already-set header, or gets a fresh ID.
pub struct RequestIdTransport {
    inner: Arc<dyn Transport>,
}

impl RequestIdTransport {
    /// Creates the decorator.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }
}

impl Transport for RequestIdTransport {
    fn round_trip(&self, mut request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        let id = match request.extensions().get::<RequestId>() {
            Some(id) => Some(*id),
            None if request.headers().contains_key(header::X_REQUEST_ID) => None,
            None => Some(RequestId::new()),
        };
        if let Some(id) = id {
            if let Ok(value) = id.to_string().parse() {
                request.headers_mut().insert(header::X_REQUEST_ID, value);
            }
        }
        self.inner.round_trip(request)
    }
}
