//! Persistence failure reported by store implementations.

use thiserror::Error;

/// A read or write against the backing store failed.
///
/// Store traits in this crate are implemented by the db crate; the message
/// carries the underlying driver error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Create a store error from any displayable cause.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
