//! Turn time bookkeeping
//!
//! The arena does not own a clock. Whoever drives it (the async runtime, a
//! test) measures wall time and reports elapsed time on pause; the timer only
//! tracks how much of the budget is left.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimer {
    budget: Duration,
    remaining: Duration,
}

impl TurnTimer {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            remaining: budget,
        }
    }

    /// Restore a timer that had already used part of its budget
    pub fn with_remaining(budget: Duration, remaining: Duration) -> Self {
        Self {
            budget,
            remaining: remaining.min(budget),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Full budget for a new turn
    pub fn reset(&mut self) {
        self.remaining = self.budget;
    }

    /// Record time spent before a pause
    pub fn pause(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }
}
