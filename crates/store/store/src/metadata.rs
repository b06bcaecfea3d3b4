use async_trait::async_trait;

use tessera_core::{FragmentRecord, OwnerId};

use crate::error::StoreError;
use crate::key::FragmentKey;

/// Structured-record storage for fragment metadata.
///
/// Records cross this boundary in their self-describing wire form
/// ([`FragmentRecord`]); backends serialize them as JSON so that a
/// store/retrieve round trip reconstructs the exact field set even
/// through a schema-agnostic remote backend.
///
/// Implementations must be `Send + Sync` and safe for concurrent
/// access; per-key atomicity is the backend's responsibility.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Store or overwrite the record for a key.
    async fn put(&self, key: &FragmentKey, record: &FragmentRecord) -> Result<(), StoreError>;

    /// Get the record for a key. Returns `None` if absent.
    async fn get(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError>;

    /// Return all records for an owner. Insertion order is not
    /// guaranteed; an owner with no fragments yields an empty set.
    async fn query(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError>;

    /// Remove the record for a key.
    ///
    /// Fails with [`StoreError::NotFound`] if the record is absent.
    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError>;
}
