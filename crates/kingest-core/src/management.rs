//! Management commands with retries.

use std::time::{Duration, Instant};

use crate::control::CancelToken;
use crate::retry::{self, RetryError, RetryPolicy};
use crate::service::{self, ServiceError, ServiceErrorKind, ServiceOp};
use crate::target::ServiceTarget;

/// Executes management (control) commands against a database.
pub trait ManagementClient {
    fn execute(&self, database: &str, command: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Run `command` against `target.database`, retrying transient service errors.
///
/// Blank command text fails as non-retryable before any attempt.
pub fn run_management<M>(
    client: &M,
    target: &ServiceTarget,
    command: &str,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<ManagementReport, RetryError<ServiceError>>
where
    M: ManagementClient + ?Sized,
{
    tracing::debug!(
        endpoint = %target.endpoint,
        database = %target.database,
        max_retries = policy.max_retries,
        max_timeout = ?policy.max_timeout,
        "management command settings"
    );

    if command.trim().is_empty() {
        return Err(RetryError::NonRetryable {
            cause: ServiceError::new(
                ServiceOp::Management,
                ServiceErrorKind::ClientArgs,
                "management command is empty",
            ),
            attempts: 0,
        });
    }

    tracing::info!("executing management commands");
    let start = Instant::now();
    let done = retry::invoke_with_retries(
        policy,
        cancel,
        &service::classify,
        |_| {},
        || client.execute(&target.database, command),
    )?;
    let elapsed = start.elapsed();
    tracing::info!(duration = ?elapsed, attempt = done.attempts, "management commands executed");

    Ok(ManagementReport {
        attempts: done.attempts,
        elapsed,
    })
}
