//! Circuit-breaker decorator.

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport};
use palisade_breaker::{BreakerError, CircuitBreaker};
use palisade_core::{Request, Response};
use std::sync::Arc;

/// Decides whether a round-trip outcome counts as a success for the gate.
pub type ResponseClassifier =
    Arc<dyn Fn(&Result<Response, TransportError>) -> bool + Send + Sync>;

/// Decorator running every round trip through a [`CircuitBreaker`].
///
/// While the gate rejects calls, the inner transport is never invoked and
/// [`TransportError::BreakerOpen`] is returned. Inner transport errors pass
/// through verbatim.
///
/// By default only transport errors count against the gate; a returned
/// `500` is a completed exchange. Pass a classifier to change that, e.g.
/// to trip on server error statuses:
///
/// ```
/// use palisade_breaker::{CircuitBreaker, Settings};
/// use palisade_test::MockTransport;
/// use palisade_transport::BreakerTransport;
/// use std::sync::Arc;
///
/// let breaker = Arc::new(CircuitBreaker::new("backend", Settings::default()).unwrap());
/// let transport = BreakerTransport::new(Arc::new(MockTransport::new()), breaker)
///     .with_classifier(Arc::new(|outcome| match outcome {
///         Ok(response) => !response.status().is_server_error(),
///         Err(_) => false,
///     }));
/// # let _ = transport;
/// ```
pub struct BreakerTransport {
    inner: Arc<dyn Transport>,
    breaker: Arc<CircuitBreaker>,
    classifier: Option<ResponseClassifier>,
}

impl BreakerTransport {
    /// Creates the decorator around an existing gate.
    ///
    /// The gate is taken by `Arc` so several transports (or direct callers)
    /// can share one health state per downstream.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            inner,
            breaker,
            classifier: None,
        }
    }

    /// Sets a custom outcome classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ResponseClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Returns the underlying gate.
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl Transport for BreakerTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(async move {
            let operation = || self.inner.round_trip(request);
            let result = match &self.classifier {
                Some(classifier) => {
                    let classifier = Arc::clone(classifier);
                    self.breaker
                        .call_with_classifier(operation, move |outcome| classifier(outcome))
                        .await
                }
                None => self.breaker.call(operation).await,
            };

            match result {
                Ok(response) => Ok(response),
                Err(BreakerError::Inner(error)) => Err(error),
                Err(
                    BreakerError::Open { name, .. }
                    | BreakerError::ProbeBudgetExhausted { name, .. },
                ) => Err(TransportError::BreakerOpen { name }),
            }
        })
    }
}
