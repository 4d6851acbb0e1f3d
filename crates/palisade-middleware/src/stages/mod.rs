//! The middleware stages.
//!
//! Each submodule holds one independent stage; there is no mandated order,
//! though recovery is usually outermost and validation innermost.

mod auth;
mod cors;
mod logging;
mod metrics;
mod recovery;
mod request_id;
mod timeout;
mod validation;

pub use auth::{
    allow_basic_auth_user, allow_bearer_token, AuthorizationFn, RequireAuthorizationMiddleware,
};
pub use cors::{CorsMiddleware, CorsOptions};
pub use logging::{RequestLogMiddleware, RequestLogOptions};
pub use metrics::RequestMetricsMiddleware;
pub use recovery::RecoveryMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use timeout::TimeoutMiddleware;
pub use validation::{JsonBodyMiddleware, RequiredHeaderMiddleware};
