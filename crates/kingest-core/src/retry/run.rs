//! Retry loop: run an operation until success, a permanent error, the deadline,
//! the attempt budget, or cancellation.

use std::fmt;
use std::time::{Duration, Instant};

use super::classify::{Classification, Classifier};
use super::error::RetryError;
use super::policy::RetryPolicy;
use crate::control::CancelToken;

/// Progress event emitted before each backoff sleep.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// 1-based number of the attempt that just failed.
    pub attempt: u32,
    /// Wait before the next attempt.
    pub delay: Duration,
    pub error: &'a E,
}

/// Successful outcome of a retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<T> {
    pub value: T,
    /// Total invocations, including the successful one.
    pub attempts: u32,
}

/// Invoke `operation` up to `policy.max_retries + 1` times.
///
/// Errors go through `classifier`: permanent errors stop immediately. For
/// retryable errors the next delay is computed first, and if waiting it would
/// cross the deadline (start + `max_timeout`) the sequence stops with
/// `TimeoutExceeded`, the final attempt included. A final attempt whose wait
/// would fit reports `RetriesExhausted` without sleeping. Otherwise `on_retry`
/// is called and the thread sleeps. `cancel` is checked before every
/// invocation and every sleep, and interrupts a sleep in progress.
pub fn invoke_with_retries<T, E, C, R, F>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    classifier: &C,
    mut on_retry: R,
    mut operation: F,
) -> Result<Completed<T>, RetryError<E>>
where
    E: fmt::Display,
    C: Classifier<E> + ?Sized,
    R: FnMut(&RetryEvent<'_, E>),
    F: FnMut() -> Result<T, E>,
{
    let start = Instant::now();
    let deadline = policy.deadline_from(start);
    // Delays must stay positive even for an unvalidated policy.
    let schedule = RetryPolicy {
        base_delay: policy.base_delay.max(Duration::from_nanos(1)),
        ..*policy
    };

    let mut attempt: u32 = 0;
    let mut last_error: Option<E> = None;
    loop {
        if cancel.is_cancelled() {
            tracing::info!(attempts = attempt, "retry sequence cancelled before attempt");
            return Err(RetryError::Cancelled {
                last_error,
                attempts: attempt,
            });
        }

        let attempts = attempt.saturating_add(1);
        tracing::debug!(attempt = attempts, max_retries = policy.max_retries, "invoking operation");
        let err = match operation() {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(
                        attempts,
                        elapsed = ?start.elapsed(),
                        "operation succeeded after retries"
                    );
                }
                return Ok(Completed { value, attempts });
            }
            Err(e) => e,
        };

        if classifier.classify(&err) == Classification::Permanent {
            tracing::error!(attempt = attempts, error = %err, "non-retryable error, aborting");
            return Err(RetryError::NonRetryable {
                cause: err,
                attempts,
            });
        }

        let delay = schedule.delay_for(attempt);
        if crosses_deadline(Instant::now(), delay, deadline) {
            tracing::error!(
                attempt = attempts,
                backoff = ?delay,
                elapsed = ?start.elapsed(),
                error = %err,
                "max timeout reached, aborting retries"
            );
            return Err(RetryError::TimeoutExceeded {
                cause: err,
                attempts,
            });
        }

        if attempt >= policy.max_retries {
            tracing::error!(
                attempts,
                max_retries = policy.max_retries,
                error = %err,
                "exhausted max retries"
            );
            return Err(RetryError::RetriesExhausted {
                cause: err,
                attempts,
            });
        }

        if cancel.is_cancelled() {
            tracing::info!(attempts, "retry sequence cancelled before backoff");
            return Err(RetryError::Cancelled {
                last_error: Some(err),
                attempts,
            });
        }

        tracing::warn!(attempt = attempts, backoff = ?delay, error = %err, "transient error, will retry");
        on_retry(&RetryEvent {
            attempt: attempts,
            delay,
            error: &err,
        });

        if cancel.sleep(delay).is_err() {
            tracing::info!(attempts, "retry sequence cancelled during backoff");
            return Err(RetryError::Cancelled {
                last_error: Some(err),
                attempts,
            });
        }

        last_error = Some(err);
        attempt = attempts;
    }
}

/// True when waiting `delay` from `now` would land after `deadline`.
fn crosses_deadline(now: Instant, delay: Duration, deadline: Option<Instant>) -> bool {
    match (deadline, now.checked_add(delay)) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(deadline), Some(wake)) => wake > deadline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_comparison() {
        let now = Instant::now();
        let deadline = now + Duration::from_secs(1);
        assert!(!crosses_deadline(now, Duration::from_millis(500), Some(deadline)));
        assert!(!crosses_deadline(now, Duration::from_secs(1), Some(deadline)));
        assert!(crosses_deadline(now, Duration::from_millis(1001), Some(deadline)));
        assert!(crosses_deadline(now, Duration::MAX, Some(deadline)));
        assert!(!crosses_deadline(now, Duration::MAX, None));
    }
}
