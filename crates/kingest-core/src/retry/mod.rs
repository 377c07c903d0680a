//! Retry and backoff engine.
//!
//! Wraps a single fallible remote operation with bounded, jittered
//! exponential retry under a wall-clock deadline. Callers supply the
//! operation and a classifier that separates transient faults from permanent
//! ones; the ingestion and management call sites share this one loop.

mod backoff;
mod classify;
mod error;
mod policy;
mod run;

pub use backoff::{calculate_delay, delay_bounds, JITTER_RATIO, MAX_DELAY};
pub use classify::{Classification, Classifier};
pub use error::{FailureReason, RetryError};
pub use policy::{PolicyError, RetryPolicy};
pub use run::{invoke_with_retries, Completed, RetryEvent};
