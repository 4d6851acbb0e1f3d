//! Request ID stage.
//!
//! Ensures every request has a correlation ID: a trusted incoming
//! `X-Request-Id` header when configured, otherwise a freshly generated
//! UUID v7. The ID is stored in the context for the other stages (logging,
//! outbound propagation) and always echoed on the response.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use palisade_core::{header, Request, RequestId, Response};
use uuid::Uuid;

/// The header used for request ID propagation.
pub const REQUEST_ID_HEADER: &str = header::X_REQUEST_ID;

/// Middleware that assigns request IDs.
///
/// By default incoming IDs are ignored and a fresh ID is generated;
/// [`RequestIdMiddleware::trust_incoming`] accepts IDs from upstream
/// services that already assigned one.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a stage that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage that reuses a valid incoming `X-Request-Id`.
    ///
    /// Only use this behind a trusted edge; an untrusted client could
    /// otherwise pollute log correlation.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = self.incoming_id(&request).unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await;

            if let Ok(value) = request_id.to_string().parse() {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        })
    }
}
