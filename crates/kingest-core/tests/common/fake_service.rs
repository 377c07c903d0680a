//! Scripted fake service clients for integration tests.
//!
//! Each fake replays a queue of results, one per call, and records what it was
//! called with. Once the script runs out, every further call succeeds.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use kingest_core::ingest::{IngestReceipt, Ingestor};
use kingest_core::management::ManagementClient;
use kingest_core::service::{ServiceError, ServiceErrorKind, ServiceOp};
use kingest_core::target::ServiceTarget;

pub fn transient(op: ServiceOp) -> ServiceError {
    ServiceError::new(op, ServiceErrorKind::Timeout, "request timed out")
}

pub fn server_error(op: ServiceOp) -> ServiceError {
    ServiceError::from_status(op, 500, "internal server error")
}

pub fn bad_request(op: ServiceOp) -> ServiceError {
    ServiceError::new(op, ServiceErrorKind::ClientArgs, "invalid arguments")
}

pub fn target() -> ServiceTarget {
    ServiceTarget::new("https://example.kusto.windows.net", "TestDatabase").unwrap()
}

#[derive(Default)]
pub struct ScriptedIngestor {
    script: RefCell<VecDeque<Result<(), ServiceError>>>,
    pub calls: RefCell<Vec<(String, PathBuf)>>,
}

impl ScriptedIngestor {
    pub fn new(script: Vec<Result<(), ServiceError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Ingestor for ScriptedIngestor {
    fn ingest_file(&self, target: &ServiceTarget, path: &Path) -> Result<IngestReceipt, ServiceError> {
        let table = target.table.clone().unwrap_or_default();
        self.calls.borrow_mut().push((table, path.to_path_buf()));
        let n = self.calls.borrow().len();
        match self.script.borrow_mut().pop_front() {
            Some(Err(e)) => Err(e),
            _ => Ok(IngestReceipt {
                operation_id: Some(format!("op-{n}")),
            }),
        }
    }
}

#[derive(Default)]
pub struct ScriptedManagementClient {
    script: RefCell<VecDeque<Result<(), ServiceError>>>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedManagementClient {
    pub fn new(script: Vec<Result<(), ServiceError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ManagementClient for ScriptedManagementClient {
    fn execute(&self, database: &str, command: &str) -> Result<(), ServiceError> {
        self.calls
            .borrow_mut()
            .push((database.to_string(), command.to_string()));
        self.script.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}
