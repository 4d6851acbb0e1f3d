//! Request metrics stage.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use palisade_core::{Request, Response};

/// Middleware that records a counter and latency histogram per request.
///
/// Emits through the `metrics` facade:
///
/// - `palisade_requests_total{method, path, status}`
/// - `palisade_request_duration_seconds{method, path}`
///
/// The path label is the raw request path; mount this behind routing if
/// your paths carry high-cardinality segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMetricsMiddleware;

impl RequestMetricsMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestMetricsMiddleware {
    fn name(&self) -> &'static str {
        "request_metrics"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().to_string();
            let path = request.uri().path().to_string();
            let start = std::time::Instant::now();

            let response = next.run(ctx, request).await;

            let elapsed = start.elapsed();
            metrics::counter!(
                "palisade_requests_total",
                "method" => method.clone(),
                "path" => path.clone(),
                "status" => response.status().as_u16().to_string()
            )
            .increment(1);
            metrics::histogram!(
                "palisade_request_duration_seconds",
                "method" => method,
                "path" => path
            )
            .record(elapsed.as_secs_f64());

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    #[tokio::test]
    async fn test_response_passes_through_unchanged() {
        let stage = RequestMetricsMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::CREATED)
                    .header("x-marker", "kept")
                    .body(Full::new(Bytes::from("created")))
                    .unwrap()
            })
        });

        let response = stage.process(&mut ctx, request, next).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-marker").unwrap(), "kept");
    }
}
