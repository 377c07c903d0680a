//! Error taxonomy of the remote ingestion service and its default classifier.
//!
//! Clients map transport results (HTTP status, socket errors) into
//! `ServiceError`; the retry engine only sees the `Classification`.

use crate::retry::Classification;
use std::fmt;

/// Which kind of service call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOp {
    Ingest,
    Management,
}

impl fmt::Display for ServiceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceOp::Ingest => write!(f, "ingest"),
            ServiceOp::Management => write!(f, "management"),
        }
    }
}

/// High-level category of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Request timed out (client or server side).
    Timeout,
    /// Service asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP error status not covered by a more specific kind.
    Http(u16),
    /// Malformed request or invalid arguments.
    ClientArgs,
    /// Rejected credentials or missing permissions.
    Auth,
    /// Bug or invariant violation inside the client.
    Internal,
    Other,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Throttled => write!(f, "throttled"),
            ServiceErrorKind::Connection => write!(f, "connection"),
            ServiceErrorKind::Http(code) => write!(f, "HTTP {}", code),
            ServiceErrorKind::ClientArgs => write!(f, "client arguments"),
            ServiceErrorKind::Auth => write!(f, "authorization"),
            ServiceErrorKind::Internal => write!(f, "internal"),
            ServiceErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Failure of a single service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{op} {kind} error: {message}")]
pub struct ServiceError {
    pub op: ServiceOp,
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(op: ServiceOp, kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            op,
            kind,
            message: message.into(),
        }
    }

    /// Build an error from a non-success HTTP status.
    pub fn from_status(op: ServiceOp, status: u16, message: impl Into<String>) -> Self {
        Self::new(op, classify_http_status(status), message)
    }

    /// Transient faults: timeouts, throttling, connection failures and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ServiceErrorKind::Timeout
            | ServiceErrorKind::Throttled
            | ServiceErrorKind::Connection => true,
            ServiceErrorKind::Http(code) => (500..=599).contains(&code),
            ServiceErrorKind::ClientArgs
            | ServiceErrorKind::Auth
            | ServiceErrorKind::Internal
            | ServiceErrorKind::Other => false,
        }
    }
}

/// Classify an HTTP status code.
pub fn classify_http_status(code: u16) -> ServiceErrorKind {
    match code {
        408 => ServiceErrorKind::Timeout,
        429 | 503 => ServiceErrorKind::Throttled,
        401 | 403 => ServiceErrorKind::Auth,
        400..=499 => ServiceErrorKind::ClientArgs,
        _ => ServiceErrorKind::Http(code),
    }
}

/// Default classifier for service calls.
pub fn classify(e: &ServiceError) -> Classification {
    Classification::from_retryable(e.is_retryable())
}
