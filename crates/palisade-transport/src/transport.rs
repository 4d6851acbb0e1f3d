//! The transport trait.

use crate::error::TransportError;
use palisade_core::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future returning a round-trip result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs one outbound HTTP round trip.
///
/// The trait is object safe so decorators can stack over `Arc<dyn
/// Transport>` without knowing the concrete inner type. A non-2xx response
/// is a successful round trip; [`TransportError`] means the exchange did
/// not complete.
pub trait Transport: Send + Sync + 'static {
    /// Sends `request` and resolves to the response.
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        (**self).round_trip(request)
    }
}
