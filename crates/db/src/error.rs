//! Store-level errors.

use blueprint_core::error::CoreError;

/// Errors raised by repository implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule or compare-and-set precondition failed.
    #[error("{0}")]
    Conflict(String),

    /// A domain rule checked atomically inside the store was violated.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The store itself is broken (e.g. a dangling parent reference).
    #[error("Store integrity error: {0}")]
    Integrity(String),
}
