//! Error types for Palisade.
//!
//! This module provides [`PalisadeError`], the error type shared by the
//! middleware stages and transport decorators, together with the
//! serializable [`ErrorEnvelope`] that middleware writes as a JSON response
//! body when it answers a request on its own (validation failure, missing
//! authorization, recovered panic, timeout).
//!
//! The taxonomy deliberately keeps one variant per user-visible failure
//! class; anything that does not fit maps to `Internal` with the underlying
//! error attached as a source.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PalisadeError`].
pub type PalisadeResult<T> = Result<T, PalisadeError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (malformed body, missing header).
    Validation,
    /// Authentication errors (invalid or missing credentials).
    Authentication,
    /// Authorization errors (no configured predicate admitted the request).
    Authorization,
    /// Internal server errors (including recovered panics).
    Internal,
    /// Downstream/external service errors.
    External,
    /// Request processing exceeded its deadline.
    Timeout,
    /// The downstream is presumed unhealthy and the call was not attempted.
    Unavailable,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::External => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Standard error type for Palisade.
///
/// # Example
///
/// ```
/// use palisade_core::{ErrorCategory, PalisadeError};
///
/// fn decode_body(raw: &str) -> Result<(), PalisadeError> {
///     if raw.is_empty() {
///         return Err(PalisadeError::validation("request body must not be empty"));
///     }
///     Ok(())
/// }
///
/// let err = decode_body("").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum PalisadeError {
    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Downstream service error.
    #[error("External service error: {message}")]
    External {
        /// Human-readable error message.
        message: String,
        /// The name of the external service, when known.
        service: Option<String>,
    },

    /// Request timeout.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Call short-circuited by a circuit breaker.
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Human-readable error message.
        message: String,
    },
}

impl PalisadeError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an external service error.
    #[must_use]
    pub fn external(message: impl Into<String>, service: Option<impl Into<String>>) -> Self {
        Self::External {
            message: message.into(),
            service: service.map(Into::into),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an unavailability error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::External { .. } => ErrorCategory::External,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_DENIED",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::External { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Unavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
}
