use std::time::{Duration, Instant};

use super::backoff;

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("base delay must be greater than zero")]
    ZeroBaseDelay,
    #[error("max delay must be greater than zero")]
    ZeroMaxDelay,
    #[error("max delay ({max:?}) is smaller than base delay ({base:?})")]
    MaxBelowBase { base: Duration, max: Duration },
}

/// Bounded exponential backoff under a wall-clock budget.
///
/// Immutable for the duration of one retry sequence. `max_delay` is optional:
/// without it delays grow until they hit the representable maximum, and the
/// overall `max_timeout` is what limits the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Wall-clock budget for the whole sequence, measured from the first attempt.
    pub max_timeout: Duration,
    /// Delay before the first retry; doubles with every further retry.
    pub base_delay: Duration,
    /// Optional cap applied to every computed delay.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_timeout: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, max_timeout_secs: u64, base_delay: Duration) -> Self {
        Self {
            max_retries,
            max_timeout: Duration::from_secs(max_timeout_secs),
            base_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.base_delay.is_zero() {
            return Err(PolicyError::ZeroBaseDelay);
        }
        match self.max_delay {
            Some(max) if max.is_zero() => Err(PolicyError::ZeroMaxDelay),
            Some(max) if max < self.base_delay => Err(PolicyError::MaxBelowBase {
                base: self.base_delay,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Attempt budget: the first try plus `max_retries` retries.
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Absolute deadline for a sequence started at `start`.
    ///
    /// `None` when the budget does not fit in an `Instant`; such a sequence is
    /// limited by the attempt budget only.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        start.checked_add(self.max_timeout)
    }

    /// Jittered delay to wait after `attempt` (0-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff::calculate_delay(i64::from(attempt), self.base_delay, self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid_and_uncapped() {
        let p = RetryPolicy::default();
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.total_attempts(), 4);
        assert!(p.max_delay.is_none());
    }

    #[test]
    fn rejects_zero_base_delay() {
        let p = RetryPolicy::new(3, 10, Duration::ZERO);
        assert_eq!(p.validate(), Err(PolicyError::ZeroBaseDelay));
    }

    #[test]
    fn rejects_bad_max_delay() {
        let base = Duration::from_secs(2);
        let p = RetryPolicy::new(3, 10, base).with_max_delay(Duration::ZERO);
        assert_eq!(p.validate(), Err(PolicyError::ZeroMaxDelay));

        let p = RetryPolicy::new(3, 10, base).with_max_delay(Duration::from_secs(1));
        assert!(matches!(p.validate(), Err(PolicyError::MaxBelowBase { .. })));
    }

    #[test]
    fn deadline_is_start_plus_budget() {
        let start = Instant::now();
        let p = RetryPolicy::new(0, 5, Duration::from_millis(10));
        assert_eq!(p.deadline_from(start), Some(start + Duration::from_secs(5)));

        let unbounded = RetryPolicy::new(0, u64::MAX, Duration::from_millis(10));
        assert_eq!(unbounded.deadline_from(start), None);
    }

    #[test]
    fn attempt_budget_does_not_overflow() {
        let p = RetryPolicy::new(u32::MAX, 0, Duration::from_millis(1));
        assert_eq!(p.total_attempts(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn delay_for_respects_cap() {
        let p = RetryPolicy::new(10, 60, Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(300));
        assert!(p.delay_for(0) >= Duration::from_millis(100));
        assert_eq!(p.delay_for(5), Duration::from_millis(300));
    }
}
