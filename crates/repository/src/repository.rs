use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument, warn};

use tessera_core::{Fragment, FragmentId, MediaType, OwnerId, ValidationError};
use tessera_store::{BlobStore, FragmentKey, MetadataStore, StoreError};

use crate::error::RepositoryError;

/// Result of a list query: bare ids, or full records when expanded.
#[derive(Debug, Clone)]
pub enum FragmentListing {
    Ids(Vec<FragmentId>),
    Expanded(Vec<Fragment>),
}

impl FragmentListing {
    /// The ids in this listing, regardless of mode.
    #[must_use]
    pub fn ids(&self) -> Vec<FragmentId> {
        match self {
            Self::Ids(ids) => ids.clone(),
            Self::Expanded(fragments) => fragments.iter().map(|f| f.id().clone()).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Expanded(fragments) => fragments.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Composes a metadata store and a blob store into transactionally
/// coherent fragment lifecycle operations.
///
/// The repository depends only on the store traits, never a concrete
/// backend; both stores are constructed once at process start and
/// injected here. Within every operation the metadata write or delete
/// precedes the corresponding blob call, which biases failures toward
/// a dangling blob (tolerable garbage) over dangling metadata. No
/// per-fragment locking is imposed: racing writes to the same key are
/// last-writer-wins per store call.
pub struct FragmentRepository {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FragmentRepository {
    /// Create a repository over the given store pair.
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { metadata, blobs }
    }

    /// Create a fragment from a Content-Type and payload.
    ///
    /// Validates the type, generates id and timestamps, then writes
    /// metadata followed by the blob. If the blob write fails the
    /// whole create fails and the just-written metadata is rolled back
    /// best-effort, so no caller can observe a fragment whose metadata
    /// claims a size the blob store does not back.
    #[instrument(skip(self, data), fields(owner = %owner))]
    pub async fn create(
        &self,
        owner: &OwnerId,
        content_type: &str,
        data: Bytes,
    ) -> Result<Fragment, RepositoryError> {
        let mut fragment = Fragment::new(owner.clone(), content_type)?;
        fragment.data_written(byte_len(&data));

        let key = FragmentKey::new(owner.clone(), fragment.id().clone());
        self.metadata.put(&key, &fragment.to_record()).await?;

        if let Err(err) = self.blobs.put(&key, data).await {
            warn!(key = %key, error = %err, "blob write failed after metadata write, rolling back");
            if let Err(rollback_err) = self.metadata.delete(&key).await {
                warn!(key = %key, error = %rollback_err, "metadata rollback failed");
            }
            return Err(err.into());
        }

        debug!(key = %key, size = fragment.size(), "fragment created");
        Ok(fragment)
    }

    /// Fetch a fragment's metadata and reconstruct the entity.
    #[instrument(skip(self), fields(owner = %owner, id = %id))]
    pub async fn by_id(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Fragment, RepositoryError> {
        let key = FragmentKey::new(owner.clone(), id.clone());
        let record = self
            .metadata
            .get(&key)
            .await?
            .ok_or_else(|| RepositoryError::not_found(owner.as_str(), id.as_str()))?;
        Ok(Fragment::try_from(record)?)
    }

    /// Fetch a fragment's raw payload.
    ///
    /// Does not itself check metadata existence; callers needing that
    /// guarantee call [`Self::by_id`] first.
    #[instrument(skip(self), fields(owner = %owner, id = %id))]
    pub async fn read_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Bytes, RepositoryError> {
        let key = FragmentKey::new(owner.clone(), id.clone());
        match self.blobs.get(&key).await {
            Ok(data) => Ok(data),
            Err(err) if err.is_not_found() => {
                Err(RepositoryError::not_found(owner.as_str(), id.as_str()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replace an existing fragment's payload.
    ///
    /// The fragment must already exist, and the supplied Content-Type
    /// must carry the same base type as the stored fragment. Refreshes
    /// `size` and `updated`; `id`, `owner`, `created`, and the type
    /// stay frozen. The metadata write precedes the blob write and the
    /// pair reports one combined outcome.
    #[instrument(skip(self, data), fields(owner = %owner, id = %id))]
    pub async fn update_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        content_type: &str,
        data: Bytes,
    ) -> Result<Fragment, RepositoryError> {
        let mut fragment = self.by_id(owner, id).await?;

        let supplied = MediaType::parse(content_type)
            .ok_or_else(|| ValidationError::UnsupportedType(content_type.to_owned()))?;
        if supplied != fragment.media_type() {
            return Err(RepositoryError::TypeMismatch {
                expected: fragment.media_type().to_string(),
                supplied: supplied.to_string(),
            });
        }

        fragment.data_written(byte_len(&data));

        let key = FragmentKey::new(owner.clone(), id.clone());
        self.metadata.put(&key, &fragment.to_record()).await?;
        self.blobs.put(&key, data).await?;

        debug!(key = %key, size = fragment.size(), "fragment data replaced");
        Ok(fragment)
    }

    /// List an owner's fragments: bare ids, or full records when
    /// `expand` is set. An owner with no fragments yields an empty
    /// listing, not an error.
    #[instrument(skip(self), fields(owner = %owner, expand))]
    pub async fn list(
        &self,
        owner: &OwnerId,
        expand: bool,
    ) -> Result<FragmentListing, RepositoryError> {
        let records = self.metadata.query(owner).await?;

        if expand {
            let fragments = records
                .into_iter()
                .map(Fragment::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FragmentListing::Expanded(fragments))
        } else {
            let ids = records
                .into_iter()
                .map(|record| FragmentId::from(record.id))
                .collect();
            Ok(FragmentListing::Ids(ids))
        }
    }

    /// Delete a fragment's metadata and payload.
    ///
    /// Metadata must exist; it is deleted first, then blob deletion is
    /// attempted best-effort. An already-absent blob is success, and
    /// any other blob-delete failure is logged as a non-fatal anomaly
    /// rather than propagated: once the metadata delete committed, the
    /// fragment is gone from the public contract, and a dangling blob
    /// is tolerable garbage where a dangling metadata record is not.
    #[instrument(skip(self), fields(owner = %owner, id = %id))]
    pub async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> Result<(), RepositoryError> {
        let key = FragmentKey::new(owner.clone(), id.clone());

        match self.metadata.delete(&key).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                return Err(RepositoryError::not_found(owner.as_str(), id.as_str()));
            }
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = self.blobs.delete(&key).await {
            match err {
                StoreError::NotFound(_) => {}
                other => {
                    warn!(key = %key, error = %other, "blob delete failed, leaving dangling blob");
                }
            }
        }

        debug!(key = %key, "fragment deleted");
        Ok(())
    }
}

fn byte_len(data: &Bytes) -> u64 {
    u64::try_from(data.len()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tessera_store_memory::{MemoryBlobStore, MemoryMetadataStore};

    use super::*;

    fn repo() -> FragmentRepository {
        FragmentRepository::new(
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryBlobStore::new()),
        )
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::from(name)
    }

    /// Blob store whose writes and deletes always fail.
    struct BrokenBlobStore;

    #[async_trait]
    impl BlobStore for BrokenBlobStore {
        async fn put(&self, _key: &FragmentKey, _data: Bytes) -> Result<(), StoreError> {
            Err(StoreError::Backend("injected put failure".to_owned()))
        }

        async fn get(&self, key: &FragmentKey) -> Result<Bytes, StoreError> {
            Err(StoreError::NotFound(key.canonical()))
        }

        async fn delete(&self, _key: &FragmentKey) -> Result<(), StoreError> {
            Err(StoreError::Backend("injected delete failure".to_owned()))
        }
    }

    #[tokio::test]
    async fn update_requires_existing_fragment() {
        let repo = repo();
        let err = repo
            .update_data(
                &owner("alice"),
                &FragmentId::from("missing"),
                "text/plain",
                Bytes::from_static(b"data"),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_rejects_different_base_type() {
        let repo = repo();
        let alice = owner("alice");
        let fragment = repo
            .create(&alice, "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let err = repo
            .update_data(
                &alice,
                fragment.id(),
                "application/json",
                Bytes::from_static(b"{}"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn update_accepts_same_base_type_with_different_parameters() {
        let repo = repo();
        let alice = owner("alice");
        let fragment = repo
            .create(&alice, "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let updated = repo
            .update_data(
                &alice,
                fragment.id(),
                "text/plain; charset=utf-8",
                Bytes::from_static(b"hello again"),
            )
            .await
            .unwrap();
        assert_eq!(updated.size(), 11);
    }

    #[tokio::test]
    async fn failed_blob_write_rolls_back_metadata() {
        let metadata: Arc<dyn MetadataStore> = Arc::new(MemoryMetadataStore::new());
        let repo = FragmentRepository::new(Arc::clone(&metadata), Arc::new(BrokenBlobStore));
        let alice = owner("alice");

        let err = repo
            .create(&alice, "text/plain", Bytes::from_static(b"doomed"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Store(_)));

        // The half-written metadata must not remain visible.
        let listing = repo.list(&alice, false).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn delete_swallows_blob_backend_failure() {
        // Seed metadata through a working pair, then delete through a
        // repository whose blob store cannot delete.
        let metadata: Arc<dyn MetadataStore> = Arc::new(MemoryMetadataStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let seeded = FragmentRepository::new(Arc::clone(&metadata), Arc::clone(&blobs));
        let alice = owner("alice");
        let fragment = seeded
            .create(&alice, "text/plain", Bytes::from_static(b"data"))
            .await
            .unwrap();

        let broken = FragmentRepository::new(Arc::clone(&metadata), Arc::new(BrokenBlobStore));
        broken
            .delete(&alice, fragment.id())
            .await
            .expect("delete commits once metadata delete succeeded");

        let err = broken.by_id(&alice, fragment.id()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_tolerates_already_absent_blob() {
        let metadata: Arc<dyn MetadataStore> = Arc::new(MemoryMetadataStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let repo = FragmentRepository::new(Arc::clone(&metadata), Arc::clone(&blobs));
        let alice = owner("alice");
        let fragment = repo
            .create(&alice, "text/plain", Bytes::from_static(b"data"))
            .await
            .unwrap();

        // Remove the blob out-of-band; the fragment delete still succeeds.
        blobs
            .delete(&FragmentKey::new(alice.clone(), fragment.id().clone()))
            .await
            .unwrap();
        repo.delete(&alice, fragment.id()).await.unwrap();
    }

    #[tokio::test]
    async fn read_data_maps_missing_blob_to_not_found() {
        let repo = repo();
        let err = repo
            .read_data(&owner("alice"), &FragmentId::from("nothing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unsupported_type_fails_validation() {
        let repo = repo();
        let err = repo
            .create(&owner("alice"), "application/xml", Bytes::from_static(b"<x/>"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Validation(ValidationError::UnsupportedType(_))
        ));
    }
}
