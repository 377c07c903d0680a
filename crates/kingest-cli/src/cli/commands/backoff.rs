//! `kingest backoff` – print the delay schedule of a retry policy.
//!
//! One row per attempt. The delay after the final attempt is never slept, but
//! it still decides whether that failure reports a timeout.

use anyhow::Result;
use kingest_core::retry::{delay_bounds, RetryPolicy};
use std::time::Duration;

/// One wait in the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// 1-based number of the failed attempt this wait follows.
    pub attempt: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Sum of minimum delays up to and including this one.
    pub cumulative_min: Duration,
    /// True if even the minimum cumulative wait crosses the time budget.
    pub past_deadline: bool,
}

pub fn schedule(policy: &RetryPolicy, waits: u32) -> Vec<ScheduleRow> {
    let mut cumulative = Duration::ZERO;
    (0..waits)
        .map(|attempt| {
            let (min_delay, max_delay) =
                delay_bounds(i64::from(attempt), policy.base_delay, policy.max_delay);
            cumulative = cumulative.saturating_add(min_delay);
            ScheduleRow {
                attempt: attempt + 1,
                min_delay,
                max_delay,
                cumulative_min: cumulative,
                past_deadline: cumulative > policy.max_timeout,
            }
        })
        .collect()
}

pub fn run_backoff(policy: &RetryPolicy, attempts: Option<u32>) -> Result<()> {
    let waits = match attempts {
        Some(n) => n,
        None => u32::try_from(policy.total_attempts()).unwrap_or(u32::MAX),
    };
    let rows = schedule(policy, waits);
    println!(
        "{:>7}  {:>14}  {:>14}  {:>14}",
        "attempt", "min delay", "max delay", "total (min)"
    );
    for row in rows {
        let marker = if row.past_deadline { "  past deadline" } else { "" };
        println!(
            "{:>7}  {:>14}  {:>14}  {:>14}{}",
            row.attempt,
            format!("{:.3?}", row.min_delay),
            format!("{:.3?}", row.max_delay),
            format!("{:.3?}", row.cumulative_min),
            marker
        );
    }
    Ok(())
}
