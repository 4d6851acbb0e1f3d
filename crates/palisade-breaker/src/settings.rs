//! Gate configuration.

use crate::counts::Counts;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Predicate over the current generation's [`Counts`] deciding whether a
/// closed gate trips open.
pub type TripPolicy = Arc<dyn Fn(&Counts) -> bool + Send + Sync>;

/// Minimum number of calls the default trip policy requires before the
/// failure ratio is considered meaningful.
const DEFAULT_MIN_REQUESTS: u32 = 5;

/// Failure ratio at or above which the default trip policy trips.
const DEFAULT_FAILURE_RATIO: f64 = 0.6;

/// Immutable configuration for a [`CircuitBreaker`](crate::CircuitBreaker).
///
/// Invalid configurations are rejected at construction time by
/// [`Settings::validate`], never at call time.
#[derive(Clone)]
pub struct Settings {
    /// Concurrent probe budget while half-open; also the number of
    /// consecutive successful probes required to close the gate again.
    pub max_half_open_requests: u32,

    /// Rolling window after which closed-state counts reset in a single
    /// jump. `None` means counts only reset on state transitions.
    pub closed_interval: Option<Duration>,

    /// How long an open gate waits before admitting probes.
    pub open_timeout: Duration,

    /// Predicate deciding the closed-to-open transition after each recorded
    /// outcome.
    pub trip_policy: TripPolicy,
}

impl Settings {
    /// The default trip policy: at least five calls in the interval and a
    /// failure ratio of 0.6 or higher.
    ///
    /// The minimum-sample-size guard runs before the ratio is computed, so
    /// the division never sees an empty window.
    #[must_use]
    pub fn default_trip_policy() -> TripPolicy {
        Arc::new(|counts: &Counts| {
            if counts.requests < DEFAULT_MIN_REQUESTS {
                return false;
            }
            let failure_ratio = f64::from(counts.failures) / f64::from(counts.requests);
            failure_ratio >= DEFAULT_FAILURE_RATIO
        })
    }

    /// Checks this configuration for values that can never work.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_half_open_requests == 0 {
            return Err(SettingsError::ZeroProbeBudget);
        }
        if self.open_timeout.is_zero() {
            return Err(SettingsError::ZeroOpenTimeout);
        }
        if let Some(interval) = self.closed_interval {
            if interval.is_zero() {
                return Err(SettingsError::ZeroClosedInterval);
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_half_open_requests: 5,
            closed_interval: Some(Duration::from_secs(60)),
            open_timeout: Duration::from_secs(60),
            trip_policy: Self::default_trip_policy(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("max_half_open_requests", &self.max_half_open_requests)
            .field("closed_interval", &self.closed_interval)
            .field("open_timeout", &self.open_timeout)
            .field("trip_policy", &"<fn>")
            .finish()
    }
}

/// Configuration errors surfaced when constructing a gate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A half-open gate with no probe budget could never close again.
    #[error("max_half_open_requests must be at least 1")]
    ZeroProbeBudget,

    /// An open gate with a zero timeout would probe immediately, defeating
    /// the point of tripping.
    #[error("open_timeout must be non-zero")]
    ZeroOpenTimeout,

    /// A zero-length counting interval would reset counts on every call.
    /// Use `None` to disable interval resets instead.
    #[error("closed_interval must be non-zero when set")]
    ZeroClosedInterval,
}
