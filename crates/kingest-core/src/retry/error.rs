//! Terminal failure of a retry sequence.

use std::fmt;

/// Why a retry sequence stopped without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The classifier marked the error permanent; no policy would help.
    NonRetryable,
    /// The next wait would have crossed the deadline.
    TimeoutExceeded,
    /// The attempt budget was used up.
    RetriesExhausted,
    /// The caller's cancellation token fired.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::NonRetryable => "non-retryable error",
            FailureReason::TimeoutExceeded => "max timeout reached",
            FailureReason::RetriesExhausted => "retries exhausted",
            FailureReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Failure returned by [`invoke_with_retries`](super::invoke_with_retries).
///
/// Every variant carries the number of attempts actually made and, except for a
/// cancellation before any attempt failed, the last underlying error.
#[derive(Debug)]
pub enum RetryError<E> {
    NonRetryable { cause: E, attempts: u32 },
    TimeoutExceeded { cause: E, attempts: u32 },
    RetriesExhausted { cause: E, attempts: u32 },
    Cancelled { last_error: Option<E>, attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn reason(&self) -> FailureReason {
        match self {
            RetryError::NonRetryable { .. } => FailureReason::NonRetryable,
            RetryError::TimeoutExceeded { .. } => FailureReason::TimeoutExceeded,
            RetryError::RetriesExhausted { .. } => FailureReason::RetriesExhausted,
            RetryError::Cancelled { .. } => FailureReason::Cancelled,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::NonRetryable { attempts, .. }
            | RetryError::TimeoutExceeded { attempts, .. }
            | RetryError::RetriesExhausted { attempts, .. }
            | RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn cause(&self) -> Option<&E> {
        match self {
            RetryError::NonRetryable { cause, .. }
            | RetryError::TimeoutExceeded { cause, .. }
            | RetryError::RetriesExhausted { cause, .. } => Some(cause),
            RetryError::Cancelled { last_error, .. } => last_error.as_ref(),
        }
    }

    pub fn into_cause(self) -> Option<E> {
        match self {
            RetryError::NonRetryable { cause, .. }
            | RetryError::TimeoutExceeded { cause, .. }
            | RetryError::RetriesExhausted { cause, .. } => Some(cause),
            RetryError::Cancelled { last_error, .. } => last_error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attempts = self.attempts();
        match self.cause() {
            Some(cause) => write!(
                f,
                "{} after {} attempt(s): {}",
                self.reason(),
                attempts,
                cause
            ),
            None => write!(f, "{} after {} attempt(s)", self.reason(), attempts),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason_attempts_and_cause() {
        let err: RetryError<String> = RetryError::RetriesExhausted {
            cause: "HTTP 500".to_string(),
            attempts: 3,
        };
        assert_eq!(err.to_string(), "retries exhausted after 3 attempt(s): HTTP 500");

        let err: RetryError<String> = RetryError::Cancelled {
            last_error: None,
            attempts: 0,
        };
        assert_eq!(err.to_string(), "cancelled after 0 attempt(s)");
    }

    #[test]
    fn accessors() {
        let err: RetryError<&str> = RetryError::TimeoutExceeded {
            cause: "timed out",
            attempts: 2,
        };
        assert_eq!(err.reason(), FailureReason::TimeoutExceeded);
        assert_eq!(err.attempts(), 2);
        assert_eq!(err.cause(), Some(&"timed out"));
        assert_eq!(err.into_cause(), Some("timed out"));
    }

    #[test]
    fn source_is_the_cause() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let err = RetryError::NonRetryable {
            cause: io,
            attempts: 1,
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("slow".to_string()));
    }
}
