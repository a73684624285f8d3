//! Classifier error types.

use thiserror::Error;

/// Failures of the classifier collaborator. Per-request and recoverable.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Convenience alias for classifier results.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Reasons a model reply is rejected by the schema check.
///
/// Never surfaced to callers: a violation turns into `unclassified`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("reply is not a valid classification object: {0}")]
    InvalidJson(String),

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("unknown smalltalk kind {0:?}")]
    UnknownSmalltalkKind(String),

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}
