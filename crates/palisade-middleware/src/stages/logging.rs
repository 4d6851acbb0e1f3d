//! Request logging stage.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use palisade_core::{Request, Response};
use regex::Regex;

/// Options for [`RequestLogMiddleware`].
#[derive(Debug, Clone, Default)]
pub struct RequestLogOptions {
    /// Regex patterns for requests that should not be logged (health
    /// checks, metrics scrapes). Each pattern is matched, anchored, against
    /// the line `"METHOD path status"`, e.g. `"GET /health 200"`.
    pub exclusions: Vec<String>,
}

/// Middleware that logs one line per request with method, path, status,
/// user agent and latency.
///
/// Server errors are logged at `error` level, everything else at `info`.
/// Requests matching an exclusion pattern are not logged at all.
pub struct RequestLogMiddleware {
    exclusions: Vec<Regex>,
}

impl RequestLogMiddleware {
    /// Creates the stage, compiling the exclusion patterns.
    ///
    /// Patterns that fail to compile are logged and skipped rather than
    /// failing construction, so a bad exclusion never disables logging
    /// entirely.
    #[must_use]
    pub fn new(options: RequestLogOptions) -> Self {
        let exclusions = options
            .exclusions
            .iter()
            .filter_map(|pattern| {
                let anchored = format!("^(?:{pattern})$");
                match Regex::new(&anchored) {
                    Ok(regex) => Some(regex),
                    Err(error) => {
                        tracing::error!(pattern, %error, "invalid log exclusion pattern, skipping");
                        None
                    }
                }
            })
            .collect();
        Self { exclusions }
    }

    fn is_excluded(&self, line: &str) -> bool {
        self.exclusions.iter().any(|regex| regex.is_match(line))
    }
}

impl Default for RequestLogMiddleware {
    fn default() -> Self {
        Self::new(RequestLogOptions::default())
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let user_agent = request
                .headers()
                .get(http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            let response = next.run(ctx, request).await;

            let status = response.status();
            let line = format!("{method} {path} {}", status.as_u16());
            if !self.is_excluded(&line) {
                let elapsed_ms = ctx.elapsed().as_millis() as u64;
                if status.is_server_error() {
                    tracing::error!(
                        %method,
                        path,
                        status = status.as_u16(),
                        user_agent,
                        elapsed_ms,
                        request_id = %ctx.request_id(),
                        "request failed"
                    );
                } else {
                    tracing::info!(
                        %method,
                        path,
                        status = status.as_u16(),
                        user_agent,
                        elapsed_ms,
                        request_id = %ctx.request_id(),
                        "request completed"
                    );
                }
            }
            response
        })
    }
}
