//! File ingestion with retries.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::control::CancelToken;
use crate::retry::{self, RetryError, RetryPolicy};
use crate::service::{self, ServiceError, ServiceErrorKind, ServiceOp};
use crate::target::ServiceTarget;

/// Acknowledgement returned by the service for a queued ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReceipt {
    /// Service-assigned identifier of the ingestion, if it reports one.
    pub operation_id: Option<String>,
}

/// Uploads a local file into a table.
pub trait Ingestor {
    fn ingest_file(&self, target: &ServiceTarget, path: &Path) -> Result<IngestReceipt, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub receipt: IngestReceipt,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Ingest `path` into `target`, retrying transient service errors per `policy`.
///
/// The target must name a table and `path` must be an existing file; otherwise
/// the call fails as non-retryable without contacting the service.
pub fn ingest_file_with_retries<I>(
    ingestor: &I,
    target: &ServiceTarget,
    path: &Path,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<IngestReport, RetryError<ServiceError>>
where
    I: Ingestor + ?Sized,
{
    tracing::debug!(
        endpoint = %target.endpoint,
        database = %target.database,
        table = ?target.table,
        source = %path.display(),
        max_retries = policy.max_retries,
        max_timeout = ?policy.max_timeout,
        "ingest settings"
    );

    let Some(table) = target.table.as_deref() else {
        return Err(rejected("ingestion target has no table"));
    };
    if !path.is_file() {
        return Err(rejected(format!(
            "source file {} does not exist",
            path.display()
        )));
    }

    tracing::info!(table, source = %path.display(), "ingesting file");
    let start = Instant::now();
    let done = retry::invoke_with_retries(
        policy,
        cancel,
        &service::classify,
        |_| {},
        || ingestor.ingest_file(target, path),
    )?;
    let elapsed = start.elapsed();
    tracing::info!(duration = ?elapsed, attempt = done.attempts, "file ingested");

    Ok(IngestReport {
        receipt: done.value,
        attempts: done.attempts,
        elapsed,
    })
}

fn rejected(message: impl Into<String>) -> RetryError<ServiceError> {
    RetryError::NonRetryable {
        cause: ServiceError::new(ServiceOp::Ingest, ServiceErrorKind::ClientArgs, message),
        attempts: 0,
    }
}
