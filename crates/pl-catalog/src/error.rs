//! Catalog error types.

use thiserror::Error;

/// Errors raised while loading or indexing the catalog. All are startup-fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed catalog: {0}")]
    Parse(String),

    #[error("invalid entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("duplicate catalog key ({intent}, {sub_intent:?}, {region})")]
    DuplicateKey {
        intent: String,
        sub_intent: String,
        region: String,
    },
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
