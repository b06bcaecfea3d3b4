use thiserror::Error;

/// Errors from metadata and blob store operations.
///
/// Backends must normalize their native "no such key" signals into
/// [`StoreError::NotFound`] before they reach the repository; the
/// repository never sees backend-specific error shapes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the normalized not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
