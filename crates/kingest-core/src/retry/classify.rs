//! Retryable vs permanent classification of operation errors.

/// Whether reattempting the failed operation could plausibly succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient fault (timeout, throttling, server error); worth retrying.
    Retryable,
    /// Caller/input fault; retrying the same request cannot help.
    Permanent,
}

impl Classification {
    pub fn from_retryable(retryable: bool) -> Self {
        if retryable {
            Classification::Retryable
        } else {
            Classification::Permanent
        }
    }

    pub fn is_retryable(self) -> bool {
        self == Classification::Retryable
    }
}

/// Decides retryability of an error. The orchestrator never looks inside `E`
/// itself; it only asks the classifier.
pub trait Classifier<E> {
    fn classify(&self, error: &E) -> Classification;
}

impl<E, F> Classifier<E> for F
where
    F: Fn(&E) -> Classification,
{
    fn classify(&self, error: &E) -> Classification {
        self(error)
    }
}
