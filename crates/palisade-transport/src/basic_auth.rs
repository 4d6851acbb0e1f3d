//! Basic-auth decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use base64::Engine;
use http::HeaderValue;
use palisade_core::{Request, Response};
use std::sync::Arc;

/// Decorator that sets `Authorization: Basic ...` on every outgoing
/// request, replacing any value already present.
///
/// The header value is computed once at construction and marked sensitive
/// so it is redacted from debug output.
pub struct BasicAuthTransport {
    inner: Arc<dyn Transport>,
    header: HeaderValue,
}

impl BasicAuthTransport {
    /// Creates the decorator for the given credentials.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, username: &str, password: &str) -> Self {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        let mut header = HeaderValue::from_str(&format!("Basic {encoded}"))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
        header.set_sensitive(true);
        Self { inner, header }
    }
}

impl Transport for BasicAuthTransport {
    fn round_trip(&self, mut request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        request
            .headers_mut()
            .insert(http::header::AUTHORIZATION, self.header.clone());
        self.inner.round_trip(request)
    }
}
