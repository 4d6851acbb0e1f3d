//! Request validation stages.
//!
//! [`JsonBodyMiddleware`] decodes and validates a typed JSON body up front,
//! handing the decoded value to the handler through the context so it is
//! deserialized exactly once. [`RequiredHeaderMiddleware`] rejects requests
//! missing a mandatory header.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use http_body_util::{BodyExt, Full};
use palisade_core::{PalisadeError, Request, Response, ResponseExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Middleware that decodes the request body as JSON into `B` before the
/// handler runs.
///
/// On success the decoded value is stored as a context extension and the
/// request continues with its body intact; on failure the chain is
/// short-circuited with a `400 Bad Request` envelope.
///
/// # Example
///
/// ```
/// use palisade_middleware::stages::JsonBodyMiddleware;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct CreateOrder {
///     item: String,
///     quantity: u32,
/// }
///
/// let stage = JsonBodyMiddleware::<CreateOrder>::new();
/// ```
pub struct JsonBodyMiddleware<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B> JsonBodyMiddleware<B> {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B> Default for JsonBodyMiddleware<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Middleware for JsonBodyMiddleware<B>
where
    B: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "json_body"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };

            let decoded: B = match serde_json::from_slice(&bytes) {
                Ok(decoded) => decoded,
                Err(error) => {
                    let request_id = ctx.request_id().to_string();
                    tracing::debug!(
                        path = parts.uri.path(),
                        %error,
                        request_id,
                        "rejecting request with undecodable JSON body"
                    );
                    let error =
                        PalisadeError::validation(format!("request body is not valid JSON: {error}"));
                    return Response::from_palisade_error(&error, Some(&request_id));
                }
            };

            ctx.set_extension(decoded);
            let request = Request::from_parts(parts, Full::new(bytes));
            next.run(ctx, request).await
        })
    }
}

/// Middleware that requires a non-empty header on every request.
pub struct RequiredHeaderMiddleware {
    header: http::HeaderName,
}

impl RequiredHeaderMiddleware {
    /// Creates the stage for the given header name.
    #[must_use]
    pub const fn new(header: http::HeaderName) -> Self {
        Self { header }
    }
}

impl Middleware for RequiredHeaderMiddleware {
    fn name(&self) -> &'static str {
        "required_header"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let present = request
                .headers()
                .get(&self.header)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                let error =
                    PalisadeError::validation(format!("missing required header: {}", self.header));
                return Response::from_palisade_error(
                    &error,
                    Some(&ctx.request_id().to_string()),
                );
            }
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct CreateOrder {
        item: String,
        quantity: u32,
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/orders")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        })
    }

    #[tokio::test]
    async fn test_valid_body_is_decoded_into_context() {
        let stage = JsonBodyMiddleware::<CreateOrder>::new();
        let mut ctx = MiddlewareContext::new();

        let response = stage
            .process(
                &mut ctx,
                json_request(r#"{"item":"widget","quantity":3}"#),
                ok_handler(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<CreateOrder>(),
            Some(&CreateOrder {
                item: "widget".to_string(),
                quantity: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let stage = JsonBodyMiddleware::<CreateOrder>::new();
        let mut ctx = MiddlewareContext::new();

        let response = stage
            .process(&mut ctx, json_request("{not json"), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!ctx.has_extension::<CreateOrder>());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_rejected() {
        let stage = JsonBodyMiddleware::<CreateOrder>::new();
        let mut ctx = MiddlewareContext::new();

        let response = stage
            .process(
                &mut ctx,
                json_request(r#"{"item":"widget","quantity":"three"}"#),
                ok_handler(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_survives_for_the_handler() {
        let stage = JsonBodyMiddleware::<CreateOrder>::new();
        let mut ctx = MiddlewareContext::new();
        let raw = r#"{"item":"widget","quantity":3}"#;

        let next = Next::handler(|_ctx, req| {
            Box::pin(async move {
                let bytes = match req.into_body().collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(never) => match never {},
                };
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(bytes))
                    .unwrap()
            })
        });
        let response = stage.process(&mut ctx, json_request(raw), next).await;
        let bytes = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        assert_eq!(bytes, Bytes::from(raw));
    }

    #[tokio::test]
    async fn test_required_header_present() {
        let stage = RequiredHeaderMiddleware::new(http::header::AUTHORIZATION);
        let mut ctx = MiddlewareContext::new();

        let request = HttpRequest::builder()
            .uri("/secure")
            .header(http::header::AUTHORIZATION, "Bearer token")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = stage.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_required_header_is_rejected() {
        let stage = RequiredHeaderMiddleware::new(http::header::AUTHORIZATION);
        let mut ctx = MiddlewareContext::new();

        let request = HttpRequest::builder()
            .uri("/secure")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = stage.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_required_header_is_rejected() {
        let stage = RequiredHeaderMiddleware::new(http::header::AUTHORIZATION);
        let mut ctx = MiddlewareContext::new();

        let request = HttpRequest::builder()
            .uri("/secure")
            .header(http::header::AUTHORIZATION, "   ")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = stage.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
