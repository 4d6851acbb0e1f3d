//! Outcome tallies for one generation of the gate.

/// Call statistics accumulated within the current generation.
///
/// Counts are cleared on every generation advance (any state transition,
/// and the closed-state interval rollover), so they never mix outcomes
/// from different epochs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Calls admitted in this generation.
    pub requests: u32,
    /// Successful outcomes recorded in this generation.
    pub successes: u32,
    /// Failed outcomes recorded in this generation.
    pub failures: u32,
    /// Length of the current success streak.
    pub consecutive_successes: u32,
    /// Length of the current failure streak.
    pub consecutive_failures: u32,
}

impl Counts {
    pub(crate) fn on_request(&mut self) {
        self.requests += 1;
    }

    pub(crate) fn on_success(&mut self) {
        self.successes += 1;
        self.consecutive_successes += 1;
        self.consecutive_failures = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.failures += 1;
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
