use thiserror::Error;

use tessera_core::ValidationError;
use tessera_store::StoreError;

/// Errors surfaced by fragment lifecycle operations.
///
/// Backend-specific shapes never leak upward: stores normalize their
/// not-found signals before the repository sees them, and everything
/// else arrives as an opaque [`StoreError`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The referenced (owner, id) pair has no metadata record.
    #[error("fragment not found: {owner}/{id}")]
    NotFound { owner: String, id: String },

    /// An update supplied a base type different from the fragment's
    /// existing type.
    #[error("type mismatch: fragment is {expected}, update supplied {supplied}")]
    TypeMismatch { expected: String, supplied: String },

    /// Malformed construction input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying backend failure not otherwise classified.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub(crate) fn not_found(owner: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            owner: owner.into(),
            id: id.into(),
        }
    }

    /// Returns `true` for the not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
