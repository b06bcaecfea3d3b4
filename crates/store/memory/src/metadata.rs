use async_trait::async_trait;
use dashmap::DashMap;

use tessera_core::{FragmentRecord, OwnerId};
use tessera_store::error::StoreError;
use tessera_store::key::FragmentKey;
use tessera_store::metadata::MetadataStore;

/// In-memory [`MetadataStore`] backed by a [`DashMap`].
///
/// Records are stored as serialized JSON strings rather than live
/// structs. This simulates the schema-agnostic remote round trip, so
/// the in-memory and remote backends exercise the identical
/// serialization discipline and stay observably interchangeable.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: DashMap<FragmentKey, String>,
}

impl MemoryMetadataStore {
    /// Create a new, empty in-memory metadata store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(record: &FragmentRecord) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(serialized: &str) -> Result<FragmentRecord, StoreError> {
        serde_json::from_str(serialized).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, key: &FragmentKey, record: &FragmentRecord) -> Result<(), StoreError> {
        let serialized = Self::encode(record)?;
        self.records.insert(key.clone(), serialized);
        Ok(())
    }

    async fn get(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError> {
        match self.records.get(key) {
            Some(entry) => Ok(Some(Self::decode(entry.value())?)),
            None => Ok(None),
        }
    }

    async fn query(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError> {
        let mut results = Vec::new();
        for entry in &self.records {
            if &entry.key().owner == owner {
                results.push(Self::decode(entry.value())?);
            }
        }
        Ok(results)
    }

    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError> {
        match self.records.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.canonical())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tessera_store::testing::run_metadata_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryMetadataStore::new();
        run_metadata_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn records_survive_the_json_round_trip() {
        let store = MemoryMetadataStore::new();
        let now = Utc::now();
        let record = FragmentRecord {
            id: "frag-1".to_owned(),
            owner_id: "owner-1".to_owned(),
            content_type: "text/plain; charset=utf-8".to_owned(),
            size: 7,
            created: now,
            updated: now,
        };
        let key = FragmentKey::new("owner-1", "frag-1");

        store.put(&key, &record).await.unwrap();

        // The map holds the serialized form, not the struct.
        let raw = store.records.get(&key).unwrap().value().clone();
        assert!(raw.contains("\"contentType\""));

        let fetched = store.get(&key).await.unwrap().unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = MemoryMetadataStore::new();
        let now = Utc::now();
        for (owner, id) in [("alice", "a-1"), ("alice", "a-2"), ("bob", "b-1")] {
            let record = FragmentRecord {
                id: id.to_owned(),
                owner_id: owner.to_owned(),
                content_type: "text/plain".to_owned(),
                size: 0,
                created: now,
                updated: now,
            };
            store
                .put(&FragmentKey::new(owner, id), &record)
                .await
                .unwrap();
        }

        let alice = store.query(&OwnerId::from("alice")).await.unwrap();
        assert_eq!(alice.len(), 2);
        let bob = store.query(&OwnerId::from("bob")).await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].id, "b-1");
    }
}
