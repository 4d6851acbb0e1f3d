//! Common HTTP types used throughout the middleware pipeline and the
//! transport decorators.

use crate::error::PalisadeError;
use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text error response with the given status and message.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON response carrying the standard error envelope for the
    /// given [`PalisadeError`].
    fn from_palisade_error(error: &PalisadeError, request_id: Option<&str>) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn from_palisade_error(error: &PalisadeError, request_id: Option<&str>) -> Response {
        let envelope = error.to_envelope(request_id);
        let body = serde_json::to_string(&envelope)
            .unwrap_or_else(|_| format!("{{\"error\":{{\"message\":\"{error}\"}}}}"));

        http::Response::builder()
            .status(error.status_code())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build JSON error response")
    }
}
