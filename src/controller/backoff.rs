//! # Exponential Backoff
//!
//! Per-resource retry delay for failed reconciliations.
//! The delay starts at a configured minimum, doubles on every failure and is
//! capped at a configured maximum. A successful reconciliation resets it.
//!
//! ## Usage
//!
//! ```rust
//! use sealed_age_controller::controller::backoff::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::new(Duration::from_secs(5), Duration::from_secs(60));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(20));
//! ```

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    max: Duration,
    current: Duration,
}

impl ExponentialBackoff {
    /// Create a backoff starting at `min` and never exceeding `max`.
    ///
    /// A `max` below `min` is raised to `min`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self { max, current: min }
    }

    /// Return the current delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        result
    }
}
