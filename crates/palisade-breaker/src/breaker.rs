//! The circuit-breaking call gate.
//!
//! Book-keeping (state reads, transitions, count mutation) happens in a
//! short critical section guarded by a mutex; the lock is never held while
//! the wrapped operation runs. A generation counter advances on every
//! transition (and on the closed-state interval rollover), and an outcome
//! recorded under a stale generation is discarded so a slow call that spans
//! a transition can never perturb the new generation's counts.
//!
//! Every admitted call records exactly one outcome. A call that vanishes
//! without producing one, because the operation panicked or its future was
//! dropped mid-flight, is recorded as a failure; an admitted slot is never
//! left occupied by a call that no longer exists.

use crate::counts::Counts;
use crate::error::BreakerError;
use crate::settings::{Settings, SettingsError};
use parking_lot::Mutex;
use std::future::Future;
use std::time::Instant;

/// Health state of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Normal operation; calls pass through.
    Closed,
    /// Failing fast; no call reaches the operation.
    Open,
    /// Probing recovery with a bounded number of concurrent calls.
    HalfOpen,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Mutable gate state, only ever touched under the lock.
struct Shared {
    state: State,
    generation: u64,
    counts: Counts,
    expiry: Option<Instant>,
}

/// Reason a call was not admitted.
enum Rejection {
    Open,
    ProbeBudget,
}

/// A circuit-breaking call gate.
///
/// Create one per downstream dependency at wiring time and share it
/// (`Arc<CircuitBreaker>`) between all callers of that dependency. All state
/// is in memory; a restarted process starts closed.
///
/// See the [crate docs](crate) for the state machine.
pub struct CircuitBreaker {
    name: String,
    settings: Settings,
    shared: Mutex<Shared>,
}

impl CircuitBreaker {
    /// Creates a new gate with the given name and settings.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the configuration can never work;
    /// misconfiguration surfaces here, not on the request path.
    pub fn new(name: impl Into<String>, settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let expiry = settings.closed_interval.map(|interval| Instant::now() + interval);
        Ok(Self {
            name: name.into(),
            settings,
            shared: Mutex::new(Shared {
                state: State::Closed,
                generation: 0,
                counts: Counts::default(),
                expiry,
            }),
        })
    }

    /// Returns the gate's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state, applying any pending time-based
    /// transition first.
    #[must_use]
    pub fn state(&self) -> State {
        let mut shared = self.shared.lock();
        self.refresh(&mut shared, Instant::now());
        shared.state
    }

    /// Returns a snapshot of the current generation's counts.
    #[must_use]
    pub fn counts(&self) -> Counts {
        let mut shared = self.shared.lock();
        self.refresh(&mut shared, Instant::now());
        shared.counts
    }

    /// Runs `operation` through the gate.
    ///
    /// If the gate does not admit the call, the operation is never invoked
    /// and a rejection variant of [`BreakerError`] is returned. Otherwise
    /// the operation's own result is returned unmodified, with failures
    /// lifted into [`BreakerError::Inner`].
    ///
    /// An `Err` outcome counts as a failure and an `Ok` outcome as a
    /// success; use [`call_with_classifier`](Self::call_with_classifier) to
    /// override that mapping. An admitted call that never produces an
    /// outcome at all, because the operation panicked or the returned
    /// future was dropped before completing, is recorded as a failure so
    /// its slot is always released.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_with_classifier(operation, Result::is_ok).await
    }

    /// Runs `operation` through the gate with a custom outcome classifier.
    ///
    /// `is_success` decides how the outcome is tallied; the value returned
    /// to the caller is the operation's result either way. This is how a
    /// caller can, for example, make 5xx responses count against the gate
    /// even though they are not transport errors.
    pub async fn call_with_classifier<T, E, F, Fut, C>(
        &self,
        operation: F,
        is_success: C,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FnOnce(&Result<T, E>) -> bool,
    {
        let generation = match self.before_call(Instant::now()) {
            Ok(generation) => generation,
            Err(Rejection::Open) => {
                return Err(BreakerError::Open {
                    name: self.name.clone(),
                    state: State::Open,
                });
            }
            Err(Rejection::ProbeBudget) => {
                return Err(BreakerError::ProbeBudgetExhausted {
                    name: self.name.clone(),
                    state: State::HalfOpen,
                });
            }
        };

        // Lock released; the real work runs unserialised. The guard keeps
        // the admitted slot accounted for: if the operation panics, or the
        // caller drops this future mid-flight (a timeout wrapper, a client
        // disconnect), the outcome is recorded as a failure instead of
        // occupying the slot forever.
        let guard = OutcomeGuard {
            breaker: self,
            generation,
            recorded: false,
        };
        let outcome = operation().await;

        let success = is_success(&outcome);
        guard.record(success);

        outcome.map_err(BreakerError::Inner)
    }

    /// Admission check. Returns the generation the call was admitted under.
    fn before_call(&self, now: Instant) -> Result<u64, Rejection> {
        let mut shared = self.shared.lock();
        self.refresh(&mut shared, now);

        match shared.state {
            State::Open => Err(Rejection::Open),
            State::HalfOpen if shared.counts.requests >= self.settings.max_half_open_requests => {
                Err(Rejection::ProbeBudget)
            }
            State::Closed | State::HalfOpen => {
                shared.counts.on_request();
                Ok(shared.generation)
            }
        }
    }

    /// Records an outcome, unless the gate has moved to a new generation
    /// since the call was admitted.
    fn after_call(&self, generation: u64, success: bool, now: Instant) {
        let mut shared = self.shared.lock();
        if shared.generation != generation {
            return;
        }

        if success {
            shared.counts.on_success();
            if shared.state == State::HalfOpen
                && shared.counts.successes >= self.settings.max_half_open_requests
            {
                self.transition(&mut shared, State::Closed, now);
            }
        } else {
            shared.counts.on_failure();
            match shared.state {
                State::Closed => {
                    if (self.settings.trip_policy)(&shared.counts) {
                        self.transition(&mut shared, State::Open, now);
                    }
                }
                State::HalfOpen => self.transition(&mut shared, State::Open, now),
                State::Open => {}
            }
        }
    }

    /// Applies time-based transitions that are evaluated lazily: the open
    /// timeout and the closed-state interval rollover.
    fn refresh(&self, shared: &mut Shared, now: Instant) {
        match shared.state {
            State::Closed => {
                if let Some(expiry) = shared.expiry {
                    if now >= expiry {
                        // Interval rollover: fresh counts, same state.
                        self.new_generation(shared, State::Closed, now);
                    }
                }
            }
            State::Open => {
                if shared.expiry.is_some_and(|expiry| now >= expiry) {
                    self.transition(shared, State::HalfOpen, now);
                }
            }
            State::HalfOpen => {}
        }
    }

    fn transition(&self, shared: &mut Shared, new_state: State, now: Instant) {
        if shared.state == new_state {
            return;
        }
        let old_state = shared.state;
        shared.state = new_state;
        self.new_generation(shared, new_state, now);

        tracing::info!(
            breaker = %self.name,
            from = %old_state,
            to = %new_state,
            "circuit breaker state change"
        );
    }

    fn new_generation(&self, shared: &mut Shared, state: State, now: Instant) {
        shared.generation += 1;
        shared.counts.clear();
        shared.expiry = match state {
            State::Closed => self.settings.closed_interval.map(|interval| now + interval),
            State::Open => Some(now + self.settings.open_timeout),
            State::HalfOpen => None,
        };
    }
}

/// Ensures every admitted call records exactly one outcome.
///
/// Normal completion goes through [`OutcomeGuard::record`]; if the guard is
/// instead dropped while armed, the call vanished without an outcome and a
/// failure is recorded on its behalf. Without this, an abandoned half-open
/// call would hold its slot indefinitely and the gate could never close
/// again (half-open has no expiry to recover through).
struct OutcomeGuard<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    recorded: bool,
}

impl OutcomeGuard<'_> {
    fn record(mut self, success: bool) {
        self.recorded = true;
        self.breaker
            .after_call(self.generation, success, Instant::now());
    }
}

impl Drop for OutcomeGuard<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker
                .after_call(self.generation, false, Instant::now());
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &shared.state)
            .field("generation", &shared.generation)
            .field("counts", &shared.counts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Trip after two failures out of at least two calls.
    fn trip_after_two_failures() -> Settings {
        Settings {
            max_half_open_requests: 1,
            closed_interval: None,
            open_timeout: Duration::from_millis(50),
            trip_policy: Arc::new(|counts| counts.requests >= 2 && counts.failures >= 2),
        }
    }

    fn counting_op(
        counter: &Arc<AtomicU32>,
        result: Result<u32, &'static str>,
    ) -> impl FnOnce() -> std::future::Ready<Result<u32, &'static str>> {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(result)
        }
    }

    #[tokio::test]
    async fn test_fail_fast_after_trip() {
        let breaker = CircuitBreaker::new("test", trip_after_two_failures()).unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let result = breaker.call(counting_op(&calls, Err("down"))).await;
            assert_eq!(result, Err(BreakerError::Inner("down")));
        }
        assert_eq!(breaker.state(), State::Open);

        // The third call is rejected without touching the operation.
        let result = breaker.call(counting_op(&calls, Ok(1))).await;
        assert!(matches!(result, Err(BreakerError::Open { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_open_timeout_admits_probe() {
        let breaker = CircuitBreaker::new("test", trip_after_two_failures()).unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        }
        assert_eq!(breaker.state(), State::Open);

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Admitted as a probe regardless of how long the gate sat idle.
        let result = breaker.call(counting_op(&calls, Ok(7))).await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // max_half_open_requests is 1, so one successful probe closes.
        assert_eq!(breaker.state(), State::Closed);

        // Closed again: calls are admitted unconditionally.
        let result = breaker.call(counting_op(&calls, Ok(8))).await;
        assert_eq!(result, Ok(8));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_half_open_single_failure_reopens() {
        let breaker = CircuitBreaker::new("test", trip_after_two_failures()).unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        // The probe fails: straight back to open, no threshold.
        let result = breaker.call(counting_op(&calls, Err("still down"))).await;
        assert_eq!(result, Err(BreakerError::Inner("still down")));
        assert_eq!(breaker.state(), State::Open);

        let result = breaker.call(counting_op(&calls, Ok(1))).await;
        assert!(matches!(result, Err(BreakerError::Open { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_half_open_requires_all_probes_to_close() {
        let settings = Settings {
            max_half_open_requests: 3,
            ..trip_after_two_failures()
        };
        let breaker = CircuitBreaker::new("test", settings).unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        let _ = breaker.call(counting_op(&calls, Ok(1))).await;
        assert_eq!(breaker.state(), State::HalfOpen);
        let _ = breaker.call(counting_op(&calls, Ok(2))).await;
        assert_eq!(breaker.state(), State::HalfOpen);
        let _ = breaker.call(counting_op(&calls, Ok(3))).await;
        assert_eq!(breaker.state(), State::Closed);
    }

    #[tokio::test]
    async fn test_probe_budget_rejects_concurrent_calls() {
        let breaker = Arc::new(CircuitBreaker::new("test", trip_after_two_failures()).unwrap());
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let slow_breaker = Arc::clone(&breaker);
        let slow_probe = tokio::spawn(async move {
            slow_breaker
                .call(move || async move {
                    release_rx.await.ok();
                    Ok::<_, &'static str>(1)
                })
                .await
        });

        // Give the probe time to occupy the single half-open slot.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(breaker.state(), State::HalfOpen);

        let result = breaker.call(counting_op(&calls, Ok(2))).await;
        assert!(matches!(
            result,
            Err(BreakerError::ProbeBudgetExhausted { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        release_tx.send(()).unwrap();
        assert_eq!(slow_probe.await.unwrap(), Ok(1));
        assert_eq!(breaker.state(), State::Closed);
    }

    #[tokio::test]
    async fn test_stale_generation_outcome_is_discarded() {
        // Trip on the first failure so a concurrent failure can force a
        // transition while a slow call is still in flight.
        let settings = Settings {
            max_half_open_requests: 1,
            closed_interval: None,
            open_timeout: Duration::from_secs(60),
            trip_policy: Arc::new(|counts| counts.failures >= 1),
        };
        let breaker = Arc::new(CircuitBreaker::new("test", settings).unwrap());

        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let slow_breaker = Arc::clone(&breaker);
        let slow_call = tokio::spawn(async move {
            slow_breaker
                .call(move || async move {
                    release_rx.await.ok();
                    Ok::<_, &'static str>(42)
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A failure trips the gate while the slow call is in flight,
        // advancing the generation.
        let _ = breaker.call(|| std::future::ready(Err::<u32, _>("down"))).await;
        assert_eq!(breaker.state(), State::Open);
        let counts_after_trip = breaker.counts();

        // The slow call completes against the old generation; the caller
        // still gets its value but the fresh counts stay untouched.
        release_tx.send(()).unwrap();
        assert_eq!(slow_call.await.unwrap(), Ok(42));
        assert_eq!(breaker.counts(), counts_after_trip);
        assert_eq!(breaker.state(), State::Open);
    }

    #[tokio::test]
    async fn test_closed_interval_rollover_resets_counts() {
        let settings = Settings {
            closed_interval: Some(Duration::from_millis(40)),
            ..trip_after_two_failures()
        };
        let breaker = CircuitBreaker::new("test", settings).unwrap();

        let _ = breaker.call(|| std::future::ready(Err::<u32, _>("down"))).await;
        assert_eq!(breaker.counts().failures, 1);

        tokio::time::sleep(Duration::from_millis(60)).await;

        // Counts reset in a single jump; the second failure lands in a
        // fresh window and the gate stays closed.
        let _ = breaker.call(|| std::future::ready(Err::<u32, _>("down"))).await;
        assert_eq!(breaker.state(), State::Closed);
        assert_eq!(breaker.counts().failures, 1);
    }

    #[tokio::test]
    async fn test_pass_through_fidelity() {
        let breaker = CircuitBreaker::new("test", Settings::default()).unwrap();

        let ok = breaker
            .call(|| std::future::ready(Ok::<_, &'static str>("payload")))
            .await;
        assert_eq!(ok, Ok("payload"));

        let err = breaker
            .call(|| std::future::ready(Err::<u32, _>("exact error")))
            .await;
        assert_eq!(err.unwrap_err().into_inner(), Some("exact error"));
    }

    #[tokio::test]
    async fn test_classifier_overrides_outcome() {
        let settings = Settings {
            max_half_open_requests: 1,
            closed_interval: None,
            open_timeout: Duration::from_secs(60),
            trip_policy: Arc::new(|counts| counts.failures >= 1),
        };
        let breaker = CircuitBreaker::new("test", settings).unwrap();

        // A 503 status is an Ok value, but the classifier counts it as a
        // failure. The caller still receives the value unmodified.
        let result = breaker
            .call_with_classifier(
                || std::future::ready(Ok::<u16, &'static str>(503)),
                |outcome| matches!(outcome, Ok(status) if *status < 500),
            )
            .await;
        assert_eq!(result, Ok(503));
        assert_eq!(breaker.state(), State::Open);
    }

    #[tokio::test]
    async fn test_trip_probe_recover_cycle() {
        // Two failing calls trip the gate; the third is rejected without
        // running; after the open timeout one successful probe closes it
        // again and a fourth call runs normally.
        let breaker = CircuitBreaker::new("test", trip_after_two_failures()).unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        let _ = breaker.call(counting_op(&calls, Err("down"))).await;

        let rejected = breaker.call(counting_op(&calls, Ok(0))).await;
        assert!(matches!(rejected, Err(BreakerError::Open { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_millis(80)).await;

        let probe = breaker.call(counting_op(&calls, Ok(1))).await;
        assert_eq!(probe, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(breaker.state(), State::Closed);

        let normal = breaker.call(counting_op(&calls, Ok(2))).await;
        assert_eq!(normal, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_aborted_half_open_call_does_not_wedge_the_gate() {
        let breaker = Arc::new(CircuitBreaker::new("test", trip_after_two_failures()).unwrap());
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let _ = breaker.call(counting_op(&calls, Err("down"))).await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Admit a call into the single half-open slot, then cancel it
        // before it can complete.
        let (_release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let slow_breaker = Arc::clone(&breaker);
        let cancelled = tokio::spawn(async move {
            slow_breaker
                .call(move || async move {
                    release_rx.await.ok();
                    Ok::<_, &'static str>(1)
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(breaker.state(), State::HalfOpen);
        cancelled.abort();
        assert!(cancelled.await.unwrap_err().is_cancelled());

        // The abandoned call counts as a failed probe: back to open, not a
        // permanently occupied slot.
        assert_eq!(breaker.state(), State::Open);

        // And the gate still recovers once the downstream is healthy.
        tokio::time::sleep(Duration::from_millis(80)).await;
        let result = breaker.call(counting_op(&calls, Ok(9))).await;
        assert_eq!(result, Ok(9));
        assert_eq!(breaker.state(), State::Closed);
    }

    #[tokio::test]
    async fn test_panicking_operation_counts_as_failure() {
        let settings = Settings {
            max_half_open_requests: 1,
            closed_interval: None,
            open_timeout: Duration::from_secs(60),
            trip_policy: Arc::new(|counts| counts.failures >= 1),
        };
        let breaker = Arc::new(CircuitBreaker::new("test", settings).unwrap());

        let panicking_breaker = Arc::clone(&breaker);
        let task = tokio::spawn(async move {
            let result: Result<u32, BreakerError<&'static str>> = panicking_breaker
                .call(|| async { panic!("operation exploded") })
                .await;
            result
        });
        assert!(task.await.unwrap_err().is_panic());

        // The panic was recorded as a failure rather than leaving the
        // admitted request unaccounted for.
        assert_eq!(breaker.state(), State::Open);
        assert_eq!(breaker.counts(), Counts::default());
    }

    #[test]
    fn test_invalid_settings_rejected_at_construction() {
        let settings = Settings {
            max_half_open_requests: 0,
            ..Settings::default()
        };
        assert!(CircuitBreaker::new("test", settings).is_err());
    }
}
