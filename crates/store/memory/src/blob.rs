use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use tessera_store::blob::BlobStore;
use tessera_store::error::StoreError;
use tessera_store::key::FragmentKey;

/// In-memory [`BlobStore`] backed by a [`DashMap`].
///
/// Payloads are kept as [`Bytes`] so reads are cheap clones of a
/// shared buffer.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<FragmentKey, Bytes>,
}

impl MemoryBlobStore {
    /// Create a new, empty in-memory blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError> {
        self.blobs.insert(key.clone(), data);
        Ok(())
    }

    async fn get(&self, key: &FragmentKey) -> Result<Bytes, StoreError> {
        match self.blobs.get(key) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(StoreError::NotFound(key.canonical())),
        }
    }

    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError> {
        // Deleting a never-written key is already-absent, not an error.
        self.blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tessera_store::testing::run_blob_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryBlobStore::new();
        run_blob_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn binary_payloads_are_untouched() {
        let store = MemoryBlobStore::new();
        let key = FragmentKey::new("owner-1", "frag-1");
        let payload = Bytes::from(vec![0u8, 159, 146, 150, 255]);
        store.put(&key, payload.clone()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), payload);
    }
}
