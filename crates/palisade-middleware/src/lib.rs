//! # Palisade Middleware
//!
//! Composable inbound HTTP middleware. Each stage wraps a handler and adds
//! one cross-cutting concern; stages are independent and can be stacked in
//! any order with [`Pipeline`].
//!
//! # Stages
//!
//! | Stage | Concern |
//! |-------|---------|
//! | [`stages::RequestIdMiddleware`] | request ID extraction/generation and response echo |
//! | [`stages::RequestLogMiddleware`] | structured completion logging with exclusion patterns |
//! | [`stages::RequestMetricsMiddleware`] | request counter and duration histogram |
//! | [`stages::CorsMiddleware`] | CORS response headers and preflight handling |
//! | [`stages::RecoveryMiddleware`] | panic containment with a JSON 500 |
//! | [`stages::JsonBodyMiddleware`] | JSON body decoding into a typed context extension |
//! | [`stages::RequiredHeaderMiddleware`] | presence check for a mandatory header |
//! | [`stages::TimeoutMiddleware`] | per-request handler deadline |
//! | [`stages::RequireAuthorizationMiddleware`] | pluggable authorization predicates |
//!
//! # Example
//!
//! ```
//! use palisade_middleware::{Pipeline, stages::RequestIdMiddleware};
//! use palisade_middleware::stages::RecoveryMiddleware;
//!
//! let pipeline = Pipeline::new()
//!     .with(RecoveryMiddleware::new())
//!     .with(RequestIdMiddleware::new());
//! assert_eq!(pipeline.stage_names(), vec!["recovery", "request_id"]);
//! ```

#![doc(html_root_url = "https://docs.rs/palisade-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
mod middleware;
mod pipeline;
pub mod stages;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::Pipeline;

/// Re-exported request/response types used by all stages.
pub use palisade_core::{Request, Response};
