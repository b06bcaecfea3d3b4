use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;
use crate::key::FragmentKey;

/// Raw byte storage for fragment payloads, keyed like the metadata
/// store by (owner, id).
///
/// Backends must be interchangeable: an in-process backend and a
/// remote-service backend must produce identical observable behavior
/// for every repository operation, including error conditions. Read
/// errors that mean "object does not exist" are normalized to
/// [`StoreError::NotFound`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store or overwrite the raw payload for a key.
    async fn put(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError>;

    /// Return the payload for a key.
    ///
    /// Fails with [`StoreError::NotFound`] if the key was never
    /// written (or the backend reports its native no-such-key signal).
    async fn get(&self, key: &FragmentKey) -> Result<Bytes, StoreError>;

    /// Remove the payload for a key.
    ///
    /// Deleting a key that was never written is success, not an error;
    /// fragment deletion relies on this being already-absent-tolerant.
    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError>;
}
