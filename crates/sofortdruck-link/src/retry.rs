// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded exponential backoff schedule for the connection monitor.
//
// interval = min(3.0s × 1.5^retry_count, 15.0s). The count increments on
// every failed probe while searching and resets to zero the moment a probe
// succeeds or the user forces a retry.

use std::time::Duration;

use tracing::debug;

/// First retry interval in seconds.
pub const INITIAL_INTERVAL_SECS: f64 = 3.0;

/// Growth factor applied per failed probe.
pub const BACKOFF_MULTIPLIER: f64 = 1.5;

/// Ceiling on the retry interval in seconds.
pub const MAX_INTERVAL_SECS: f64 = 15.0;

/// Retry bookkeeping for the probe loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrySchedule {
    retry_count: u32,
}

impl RetrySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consecutive failed probes.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Interval to wait before the next probe at the current failure count.
    ///
    /// Monotonically non-decreasing in the count and capped at
    /// [`MAX_INTERVAL_SECS`].
    pub fn current_interval(&self) -> Duration {
        let secs = (INITIAL_INTERVAL_SECS * BACKOFF_MULTIPLIER.powi(self.retry_count.min(64) as i32))
            .min(MAX_INTERVAL_SECS);
        Duration::from_secs_f64(secs)
    }

    /// Record a failed probe.
    pub fn record_failure(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
        debug!(retry_count = self.retry_count, "probe failure recorded");
    }

    /// Reset after a successful probe or a manual retry.
    pub fn reset(&mut self) {
        if self.retry_count != 0 {
            debug!(was = self.retry_count, "retry schedule reset");
        }
        self.retry_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval_at(count: u32) -> f64 {
        let mut schedule = RetrySchedule::new();
        for _ in 0..count {
            schedule.record_failure();
        }
        schedule.current_interval().as_secs_f64()
    }

    #[test]
    fn interval_follows_bounded_exponential() {
        assert!((interval_at(0) - 3.0).abs() < 1e-9);
        assert!((interval_at(1) - 4.5).abs() < 1e-9);
        assert!((interval_at(2) - 6.75).abs() < 1e-9);
        assert!((interval_at(3) - 10.125).abs() < 1e-9);
        // 3.0 * 1.5^4 = 15.1875 — capped.
        assert!((interval_at(4) - 15.0).abs() < 1e-9);
        assert!((interval_at(20) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn interval_is_monotonically_non_decreasing() {
        let mut previous = 0.0;
        for count in 0..30 {
            let interval = interval_at(count);
            assert!(interval >= previous, "interval shrank at count {count}");
            assert!(interval <= MAX_INTERVAL_SECS);
            previous = interval;
        }
    }

    #[test]
    fn reset_returns_to_initial_interval() {
        let mut schedule = RetrySchedule::new();
        for _ in 0..7 {
            schedule.record_failure();
        }
        assert_eq!(schedule.current_interval(), Duration::from_secs_f64(15.0));

        schedule.reset();
        assert_eq!(schedule.retry_count(), 0);
        assert_eq!(schedule.current_interval(), Duration::from_secs_f64(3.0));
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let mut schedule = RetrySchedule::new();
        for _ in 0..1000 {
            schedule.record_failure();
        }
        assert_eq!(schedule.current_interval(), Duration::from_secs_f64(15.0));
    }
}
