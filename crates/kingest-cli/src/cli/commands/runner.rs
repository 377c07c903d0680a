//! Shared plumbing for commands that drive the blocking retry engine.

use anyhow::{Context, Result};
use kingest_core::control::CancelToken;
use kingest_core::retry::{FailureReason, RetryError};

/// Exit code reported when the sequence was cancelled (128 + SIGINT).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Map a terminal result to the process exit code.
pub fn exit_code<T, E>(result: &Result<T, RetryError<E>>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) if e.reason() == FailureReason::Cancelled => CANCELLED_EXIT_CODE,
        Err(_) => 1,
    }
}

/// Run `work` on the blocking pool with a token that Ctrl-C cancels.
pub async fn run_cancellable<T, W>(work: W) -> Result<T>
where
    T: Send + 'static,
    W: FnOnce(&CancelToken) -> T + Send + 'static,
{
    let cancel = CancelToken::new();

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling retries");
                cancel.cancel();
            }
        })
    };

    let result = tokio::task::spawn_blocking(move || work(&cancel))
        .await
        .context("retry worker failed");
    interrupt.abort();
    result
}
