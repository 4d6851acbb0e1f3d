//! Transport error type.

use std::time::Duration;
use thiserror::Error;

/// A failure to complete an HTTP round trip.
///
/// Response statuses are deliberately not represented here; a `500` from
/// the server is a completed exchange and flows back as a [`Response`]
/// (decorators that care about statuses inspect the response themselves).
///
/// [`Response`]: palisade_core::Response
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection to the downstream could not be established.
    #[error("connect failed: {message}")]
    Connect {
        /// Description of the connection failure.
        message: String,
    },

    /// The round trip did not complete within the configured deadline.
    #[error("request timed out after {deadline:?}")]
    Timeout {
        /// The deadline that was exceeded.
        deadline: Duration,
    },

    /// A circuit breaker refused to attempt the round trip.
    #[error("circuit breaker '{name}' rejected the request: failing fast")]
    BreakerOpen {
        /// Name of the breaker that short-circuited the call.
        name: String,
    },

    /// Any other transport failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransportError {
    /// Creates a connect error.
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Returns `true` when the request never reached the downstream
    /// because a breaker short-circuited it.
    #[must_use]
    pub const fn is_breaker_open(&self) -> bool {
        matches!(self, Self::BreakerOpen { .. })
    }
}
