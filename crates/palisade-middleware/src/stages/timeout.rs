//! Request deadline stage.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use palisade_core::{PalisadeError, Request, Response, ResponseExt};
use std::time::Duration;

/// Middleware that bounds downstream processing time.
///
/// When the deadline passes before the rest of the chain produces a
/// response, the in-flight work is dropped and a `504 Gateway Timeout`
/// envelope is returned.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    deadline: Duration,
}

impl TimeoutMiddleware {
    /// Creates the stage with the given per-request deadline.
    #[must_use]
    pub const fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Returns the configured deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl Middleware for TimeoutMiddleware {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let path = request.uri().path().to_string();

            match tokio::time::timeout(self.deadline, next.run(ctx, request)).await {
                Ok(response) => response,
                Err(_) => {
                    tracing::warn!(
                        path,
                        deadline_ms = self.deadline.as_millis() as u64,
                        request_id = %request_id,
                        "request exceeded deadline"
                    );
                    let error = PalisadeError::timeout(format!(
                        "request exceeded {}ms deadline",
                        self.deadline.as_millis()
                    ));
                    Response::from_palisade_error(&error, Some(&request_id.to_string()))
                }
            }
        })
    }
}
