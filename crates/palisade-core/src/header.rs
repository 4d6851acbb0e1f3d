//! Header name constants shared across middleware and transport decorators.
//!
//! The `http` crate covers the standard names; the constants here are the
//! ones it does not provide or that middleware needs as plain strings for
//! response header lists.

/// Request ID propagation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// `Access-Control-Max-Age` preflight cache header.
pub const ACCESS_CONTROL_MAX_AGE: &str = "access-control-max-age";

/// `Content-Security-Policy` header, exposed to CORS clients by default.
pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
