//! Error type returned by [`CircuitBreaker::call`](crate::CircuitBreaker::call).

use crate::breaker::State;
use thiserror::Error;

/// Either a short-circuit produced by the gate itself or the operation's own
/// error, passed through verbatim.
///
/// The two rejection variants are always distinguishable from a genuine
/// downstream failure; callers typically map them to a 503-class response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakerError<E> {
    /// The gate is open; the operation was never invoked.
    #[error("circuit breaker '{name}' is {state}: failing fast")]
    Open {
        /// Name of the gate that rejected the call.
        name: String,
        /// The gate state at rejection time.
        state: State,
    },

    /// The gate is half-open and all probe slots are taken; the operation
    /// was never invoked.
    #[error("circuit breaker '{name}' is {state}: probe budget exhausted")]
    ProbeBudgetExhausted {
        /// Name of the gate that rejected the call.
        name: String,
        /// The gate state at rejection time.
        state: State,
    },

    /// The operation ran and failed; its error is carried unmodified.
    #[error("{0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// Returns `true` if the gate rejected the call without running the
    /// operation.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::ProbeBudgetExhausted { .. })
    }

    /// Returns the operation's own error, if the operation ran and failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(inner) => Some(inner),
            _ => None,
        }
    }
}
