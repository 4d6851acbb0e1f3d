//! Scripted mock transport.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use palisade_core::{Request, Response};
use palisade_transport::{BoxFuture, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

type RequestCheck = Box<dyn Fn(&RequestRecord) + Send + Sync>;

struct Step {
    check: Option<RequestCheck>,
    delay: Option<Duration>,
    outcome: Result<Response, TransportError>,
}

/// What the mock saw of one request: everything except the body, cloned so
/// the test can assert on it after the call.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// The request method.
    pub method: Method,
    /// The request URI.
    pub uri: Uri,
    /// The request headers.
    pub headers: HeaderMap,
}

/// A scripted stand-in for a real HTTP transport.
///
/// Each queued step is consumed by one round trip, in order; once the
/// script is exhausted every further request gets an empty `200`. All
/// requests are recorded for later assertions.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use palisade_test::MockTransport;
/// use palisade_transport::Transport;
///
/// # async fn demo() {
/// let mock = MockTransport::new();
/// mock.push_status(StatusCode::NOT_FOUND);
///
/// let request = http::Request::builder()
///     .uri("http://backend/missing")
///     .body(http_body_util::Full::new(bytes::Bytes::new()))
///     .unwrap();
/// let response = mock.round_trip(request).await.unwrap();
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// assert_eq!(mock.request_count(), 1);
/// # }
/// ```
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<RequestRecord>>,
}

impl MockTransport {
    /// Creates a mock with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a full response.
    pub fn push_response(&self, response: Response) {
        self.push_step(Step {
            check: None,
            delay: None,
            outcome: Ok(response),
        });
    }

    /// Queues an empty-bodied response with the given status.
    pub fn push_status(&self, status: StatusCode) {
        self.push_response(empty_response(status));
    }

    /// Queues an empty-bodied response that resolves only after `delay`.
    ///
    /// Pairs with `tokio::time::pause` to test timeout decorators without
    /// real waiting.
    pub fn push_delayed_status(&self, status: StatusCode, delay: Duration) {
        self.push_step(Step {
            check: None,
            delay: Some(delay),
            outcome: Ok(empty_response(status)),
        });
    }

    /// Queues a transport error.
    pub fn push_error(&self, error: TransportError) {
        self.push_step(Step {
            check: None,
            delay: None,
            outcome: Err(error),
        });
    }

    /// Queues a response guarded by an assertion over the incoming request.
    ///
    /// The check runs before the response is returned and should panic
    /// (via `assert!`) on an unexpected request.
    pub fn push_checked<C>(&self, check: C, response: Response)
    where
        C: Fn(&RequestRecord) + Send + Sync + 'static,
    {
        self.push_step(Step {
            check: Some(Box::new(check)),
            delay: None,
            outcome: Ok(response),
        });
    }

    fn push_step(&self, step: Step) {
        self.script.lock().push_back(step);
    }

    /// Returns all requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.requests.lock().clone()
    }

    /// Returns how many requests reached the mock.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns `true` when every queued step has been consumed.
    #[must_use]
    pub fn script_exhausted(&self) -> bool {
        self.script.lock().is_empty()
    }
}

impl Transport for MockTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        let record = RequestRecord {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        };
        self.requests.lock().push(record.clone());

        let step = self.script.lock().pop_front();
        Box::pin(async move {
            let Some(step) = step else {
                return Ok(empty_response(StatusCode::OK));
            };
            if let Some(check) = &step.check {
                check(&record);
            }
            if let Some(delay) = step.delay {
                tokio::time::sleep(delay).await;
            }
            step.outcome
        })
    }
}

fn empty_response(status: StatusCode) -> Response {
    http::Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .expect("failed to build mock response")
}
