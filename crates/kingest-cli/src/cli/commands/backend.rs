//! Service client backed by an external program.
//!
//! The program gets the target in its environment (`KINGEST_OPERATION`,
//! `KINGEST_ENDPOINT`, `KINGEST_DATABASE`, `KINGEST_TABLE`). For ingestion the
//! source path is appended as the last argument and the first non-empty line
//! of stdout, if any, is taken as the operation id. Management scripts are
//! written to its stdin. Exit codes are classified like `kingest exec`.

use kingest_core::ingest::{IngestReceipt, Ingestor};
use kingest_core::management::ManagementClient;
use kingest_core::retry::Classification;
use kingest_core::service::{ServiceError, ServiceErrorKind, ServiceOp};
use kingest_core::target::ServiceTarget;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use super::exec::{check_status, CommandError, CommandSpec};

pub struct CommandBackend {
    spec: CommandSpec,
    target: ServiceTarget,
}

impl CommandBackend {
    pub fn new(spec: CommandSpec, target: ServiceTarget) -> Self {
        Self { spec, target }
    }

    fn command(&self, op: ServiceOp, target: &ServiceTarget) -> Command {
        let mut cmd = self.spec.command();
        cmd.env("KINGEST_OPERATION", op.to_string())
            .env("KINGEST_ENDPOINT", target.endpoint.as_str())
            .env("KINGEST_DATABASE", &target.database);
        match &target.table {
            Some(table) => cmd.env("KINGEST_TABLE", table),
            None => cmd.env_remove("KINGEST_TABLE"),
        };
        cmd
    }

    /// Translate a failed run into the service taxonomy, keeping its retryability.
    pub fn service_error(&self, op: ServiceOp, e: &CommandError) -> ServiceError {
        let kind = match (self.spec.classify(e), e) {
            (Classification::Retryable, CommandError::Exit(_)) => ServiceErrorKind::Throttled,
            (Classification::Retryable, _) => ServiceErrorKind::Connection,
            (Classification::Permanent, CommandError::Exit(_)) => ServiceErrorKind::ClientArgs,
            (Classification::Permanent, _) => ServiceErrorKind::Internal,
        };
        ServiceError::new(op, kind, format!("{}: {}", self.spec.program, e))
    }
}

impl Ingestor for CommandBackend {
    fn ingest_file(&self, target: &ServiceTarget, path: &Path) -> Result<IngestReceipt, ServiceError> {
        let op = ServiceOp::Ingest;
        let output = self
            .command(op, target)
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.service_error(op, &CommandError::Spawn(e)))?;
        check_status(output.status).map_err(|e| self.service_error(op, &e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let operation_id = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        Ok(IngestReceipt { operation_id })
    }
}

impl ManagementClient for CommandBackend {
    fn execute(&self, database: &str, command: &str) -> Result<(), ServiceError> {
        let op = ServiceOp::Management;
        let mut target = self.target.clone();
        target.database = database.to_string();

        let mut child = self
            .command(op, &target)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.service_error(op, &CommandError::Spawn(e)))?;
        if let Some(mut stdin) = child.stdin.take() {
            // A backend that exits without reading its input shows up in the status.
            if let Err(e) = stdin.write_all(command.as_bytes()) {
                tracing::debug!(error = %e, "backend closed stdin early");
            }
        }
        let status = child
            .wait()
            .map_err(|e| self.service_error(op, &CommandError::Spawn(e)))?;
        check_status(status).map_err(|e| self.service_error(op, &e))
    }
}
