//! Panic recovery stage.
//!
//! Converts a panic anywhere downstream into a JSON 500 response instead of
//! tearing down the connection task. Mount it outermost so every other
//! stage is covered.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use futures_util::FutureExt;
use palisade_core::{PalisadeError, Request, Response, ResponseExt};
use std::panic::AssertUnwindSafe;

/// Middleware that catches panics from downstream stages and the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            match AssertUnwindSafe(next.run(ctx, request)).catch_unwind().await {
                Ok(response) => response,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        %method,
                        path,
                        request_id = %request_id,
                        panic = message,
                        "recovered from panic while handling request"
                    );
                    let error = PalisadeError::internal("internal server error");
                    Response::from_palisade_error(&error, Some(&request_id.to_string()))
                }
            }
        })
    }
}
