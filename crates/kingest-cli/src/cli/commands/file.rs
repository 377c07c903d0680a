//! `kingest file <SOURCE> --table T` – ingest a local file.

use anyhow::Result;
use kingest_core::ingest;
use kingest_core::retry::RetryPolicy;
use kingest_core::target::ServiceTarget;
use std::path::PathBuf;

use super::backend::CommandBackend;
use super::runner::{exit_code, run_cancellable};

pub async fn run_file(
    policy: RetryPolicy,
    backend: CommandBackend,
    target: ServiceTarget,
    source: PathBuf,
) -> Result<i32> {
    let shown = source.display().to_string();
    let result = run_cancellable(move |cancel| {
        ingest::ingest_file_with_retries(&backend, &target, &source, &policy, cancel)
    })
    .await?;

    match &result {
        Ok(report) => println!(
            "ingested {} (operation {}, {} attempt(s), {:.3?})",
            shown,
            report.receipt.operation_id.as_deref().unwrap_or("-"),
            report.attempts,
            report.elapsed
        ),
        Err(e) => eprintln!("kingest: ingest {}: {}", shown, e),
    }
    Ok(exit_code(&result))
}
