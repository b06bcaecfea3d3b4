use bytes::Bytes;
use chrono::Utc;

use tessera_core::{FragmentRecord, OwnerId};

use crate::blob::BlobStore;
use crate::error::StoreError;
use crate::key::FragmentKey;
use crate::metadata::MetadataStore;

fn test_record(owner: &str, id: &str, content_type: &str, size: u64) -> FragmentRecord {
    let now = Utc::now();
    FragmentRecord {
        id: id.to_owned(),
        owner_id: owner.to_owned(),
        content_type: content_type.to_owned(),
        size,
        created: now,
        updated: now,
    }
}

fn key_of(record: &FragmentRecord) -> FragmentKey {
    FragmentKey::new(record.owner_id.as_str(), record.id.as_str())
}

/// Run the full metadata store conformance test suite.
///
/// Call this from your backend's test module with a fresh store
/// instance; it is what makes the in-process and remote backends
/// observably identical.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_metadata_conformance_tests(store: &dyn MetadataStore) -> Result<(), StoreError> {
    test_get_missing(store).await?;
    test_put_get_roundtrip(store).await?;
    test_put_overwrites(store).await?;
    test_query_by_owner(store).await?;
    test_query_unknown_owner_is_empty(store).await?;
    test_delete(store).await?;
    test_delete_missing_is_not_found(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "missing");
    let record = store.get(&key).await?;
    assert!(record.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_put_get_roundtrip(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let record = test_record("conf-owner", "roundtrip", "text/plain; charset=utf-8", 11);
    store.put(&key_of(&record), &record).await?;

    let fetched = store.get(&key_of(&record)).await?;
    let fetched = fetched.expect("record should exist after put");
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.owner_id, record.owner_id);
    assert_eq!(fetched.content_type, record.content_type);
    assert_eq!(fetched.size, record.size);
    assert_eq!(fetched.created, record.created);
    assert_eq!(fetched.updated, record.updated);
    Ok(())
}

async fn test_put_overwrites(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let mut record = test_record("conf-owner", "overwrite", "application/json", 2);
    store.put(&key_of(&record), &record).await?;

    record.size = 99;
    record.updated = Utc::now();
    store.put(&key_of(&record), &record).await?;

    let fetched = store.get(&key_of(&record)).await?.expect("record exists");
    assert_eq!(fetched.size, 99, "put should overwrite the prior record");
    Ok(())
}

async fn test_query_by_owner(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let owner = OwnerId::from("conf-query-owner");
    let other = test_record("conf-other-owner", "other-1", "text/plain", 1);
    store.put(&key_of(&other), &other).await?;

    let mut ids = Vec::new();
    for n in 0..3 {
        let record = test_record(owner.as_str(), &format!("q-{n}"), "text/markdown", n);
        store.put(&key_of(&record), &record).await?;
        ids.push(record.id.clone());
    }

    let mut found: Vec<String> = store
        .query(&owner)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    found.sort();
    ids.sort();
    assert_eq!(found, ids, "query should return exactly the owner's records");
    Ok(())
}

async fn test_query_unknown_owner_is_empty(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let records = store.query(&OwnerId::from("conf-nobody")).await?;
    assert!(records.is_empty(), "unknown owner should yield an empty set");
    Ok(())
}

async fn test_delete(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let record = test_record("conf-owner", "to-delete", "text/plain", 3);
    store.put(&key_of(&record), &record).await?;
    store.delete(&key_of(&record)).await?;
    let fetched = store.get(&key_of(&record)).await?;
    assert!(fetched.is_none(), "get after delete should return None");
    Ok(())
}

async fn test_delete_missing_is_not_found(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "never-written");
    let err = store
        .delete(&key)
        .await
        .expect_err("delete on missing record should fail");
    assert!(err.is_not_found(), "expected NotFound, got: {err}");
    Ok(())
}

/// Run the full blob store conformance test suite.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), StoreError> {
    test_blob_get_missing(store).await?;
    test_blob_put_get_roundtrip(store).await?;
    test_blob_put_overwrites(store).await?;
    test_blob_delete(store).await?;
    test_blob_delete_absent_is_ok(store).await?;
    Ok(())
}

async fn test_blob_get_missing(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "blob-missing");
    let err = store
        .get(&key)
        .await
        .expect_err("get on missing blob should fail");
    assert!(err.is_not_found(), "expected NotFound, got: {err}");
    Ok(())
}

async fn test_blob_put_get_roundtrip(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "blob-roundtrip");
    let payload = Bytes::from_static(b"hello fragment \x00\x01\x02");
    store.put(&key, payload.clone()).await?;
    let fetched = store.get(&key).await?;
    assert_eq!(fetched, payload, "blob bytes should round-trip verbatim");
    Ok(())
}

async fn test_blob_put_overwrites(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "blob-overwrite");
    store.put(&key, Bytes::from_static(b"first")).await?;
    store.put(&key, Bytes::from_static(b"second")).await?;
    let fetched = store.get(&key).await?;
    assert_eq!(fetched, Bytes::from_static(b"second"));
    Ok(())
}

async fn test_blob_delete(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "blob-delete");
    store.put(&key, Bytes::from_static(b"bye")).await?;
    store.delete(&key).await?;
    let err = store
        .get(&key)
        .await
        .expect_err("get after delete should fail");
    assert!(err.is_not_found());
    Ok(())
}

async fn test_blob_delete_absent_is_ok(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new("conf-owner", "blob-never-written");
    store.delete(&key).await?;
    Ok(())
}
