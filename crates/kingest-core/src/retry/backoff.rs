//! Exponential backoff with bounded jitter, safe against duration overflow.

use rand::Rng;
use std::time::Duration;

/// Largest delay the calculator ever returns when no explicit cap is given.
pub const MAX_DELAY: Duration = Duration::MAX;

/// Upper bound (exclusive) of the jitter factor: delays grow by up to 10%.
pub const JITTER_RATIO: f64 = 0.1;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Compute the wait before the next attempt.
///
/// `attempt` is the 0-based number of retries already performed. The result is
/// `base_delay * 2^attempt * (1 + U)` with `U` drawn uniformly from `[0, 0.1)`.
/// When the exponential term does not fit, it is clamped to `max_delay` (or
/// [`MAX_DELAY`]) before jitter is applied; the jittered value is clamped again.
///
/// A negative `attempt` returns `base_delay` unchanged.
pub fn calculate_delay(attempt: i64, base_delay: Duration, max_delay: Option<Duration>) -> Duration {
    if attempt < 0 {
        return base_delay;
    }

    let ceiling = max_delay.unwrap_or(MAX_DELAY);
    let delay = match exponential(attempt, base_delay) {
        Some(d) if d < ceiling => d,
        // Jitter only inflates, so a clamped delay stays at the ceiling.
        _ => return ceiling,
    };

    let jitter = rand::rng().random_range(0.0..JITTER_RATIO);
    with_jitter(delay, jitter).min(ceiling)
}

/// Smallest and largest value [`calculate_delay`] can return for these inputs.
pub fn delay_bounds(
    attempt: i64,
    base_delay: Duration,
    max_delay: Option<Duration>,
) -> (Duration, Duration) {
    if attempt < 0 {
        return (base_delay, base_delay);
    }
    let ceiling = max_delay.unwrap_or(MAX_DELAY);
    let low = exponential(attempt, base_delay).map_or(ceiling, |d| d.min(ceiling));
    let high = with_jitter(low, JITTER_RATIO).min(ceiling);
    (low, high)
}

/// `base * 2^attempt`, or `None` if it exceeds [`MAX_DELAY`].
///
/// Bounds are checked in 128-bit nanoseconds before each multiplication.
fn exponential(attempt: i64, base: Duration) -> Option<Duration> {
    let shift = u32::try_from(attempt).ok().filter(|s| *s < u128::BITS)?;
    let multiplier = 1u128 << shift;
    let base_nanos = base.as_nanos();
    if base_nanos > MAX_DELAY.as_nanos() / multiplier {
        return None;
    }
    from_nanos(base_nanos * multiplier)
}

fn from_nanos(nanos: u128) -> Option<Duration> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, subsec))
}

/// `delay * (1 + jitter)`, saturating at [`MAX_DELAY`].
fn with_jitter(delay: Duration, jitter: f64) -> Duration {
    let extra = match Duration::try_from_secs_f64(delay.as_secs_f64() * jitter) {
        Ok(extra) => extra,
        Err(_) => return MAX_DELAY,
    };
    delay.checked_add(extra).unwrap_or(MAX_DELAY)
}
