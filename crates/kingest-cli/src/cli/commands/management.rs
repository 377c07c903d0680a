//! `kingest management <SCRIPT_FILE>` – run management commands read from a file.

use anyhow::{Context, Result};
use kingest_core::management;
use kingest_core::retry::RetryPolicy;
use kingest_core::target::ServiceTarget;
use std::fs;
use std::path::Path;

use super::backend::CommandBackend;
use super::runner::{exit_code, run_cancellable};

pub async fn run_management(
    policy: RetryPolicy,
    backend: CommandBackend,
    target: ServiceTarget,
    script: &Path,
) -> Result<i32> {
    let commands = fs::read_to_string(script)
        .with_context(|| format!("read management script {}", script.display()))?;

    let result = run_cancellable(move |cancel| {
        management::run_management(&backend, &target, &commands, &policy, cancel)
    })
    .await?;

    match &result {
        Ok(report) => println!(
            "management commands executed ({} attempt(s), {:.3?})",
            report.attempts, report.elapsed
        ),
        Err(e) => eprintln!("kingest: management {}: {}", script.display(), e),
    }
    Ok(exit_code(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::CommandSpec;
    use std::time::Duration;

    fn target() -> ServiceTarget {
        ServiceTarget::new("https://example.kusto.windows.net", "TestDatabase").unwrap()
    }

    fn backend(script: &str) -> CommandBackend {
        let spec = CommandSpec::new(vec!["sh".into(), "-c".into(), script.into()], vec![]).unwrap();
        CommandBackend::new(spec, target())
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, 30, Duration::from_millis(5))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_script_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.kql");
        fs::write(&script, ".create table Events (x: int)\n").unwrap();
        let received = dir.path().join("received.kql");
        let b = backend(&format!("cat > '{}'", received.display()));

        let code = run_management(fast_policy(2), b, target(), &script).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(
            fs::read_to_string(&received).unwrap(),
            ".create table Events (x: int)\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exhausted_retries_exit_1() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.kql");
        fs::write(&script, ".show tables").unwrap();
        let b = backend("cat >/dev/null; exit 75");
        let code = run_management(fast_policy(1), b, target(), &script).await.unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn blank_script_exit_1() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("empty.kql");
        fs::write(&script, "  \n").unwrap();
        let code = run_management(fast_policy(1), backend("true"), target(), &script)
            .await
            .unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn missing_script_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_management(
            fast_policy(1),
            backend("true"),
            target(),
            &dir.path().join("nope.kql"),
        )
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("read management script"));
    }
}
