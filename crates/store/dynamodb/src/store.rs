use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use tessera_core::{FragmentRecord, OwnerId};
use tessera_store::error::StoreError;
use tessera_store::key::FragmentKey;
use tessera_store::metadata::MetadataStore;

use crate::config::DynamoConfig;
use crate::table::{PK_ATTR, RECORD_ATTR, SK_ATTR};

/// `DynamoDB`-backed implementation of [`MetadataStore`].
///
/// Uses a single table with composite primary key (`ownerId`, `id`).
/// The full record travels as a serialized JSON string in the `record`
/// attribute, keeping the table schema-agnostic about fragment fields.
pub struct DynamoMetadataStore {
    client: Client,
    table_name: String,
}

impl DynamoMetadataStore {
    /// Create a new `DynamoMetadataStore` from the provided configuration.
    ///
    /// Loads AWS credentials and configuration from the environment and
    /// optionally overrides the endpoint URL for local development.
    pub async fn new(config: &DynamoConfig) -> Self {
        let client = build_client(config).await;
        Self {
            client,
            table_name: config.table_name.clone(),
        }
    }

    /// Create a `DynamoMetadataStore` from an existing `DynamoDB` client.
    #[must_use]
    pub fn from_client(client: Client, config: &DynamoConfig) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
        }
    }

    fn encode(record: &FragmentRecord) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(serialized: &str) -> Result<FragmentRecord, StoreError> {
        serde_json::from_str(serialized).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn record_from_item(
        item: &std::collections::HashMap<String, AttributeValue>,
    ) -> Result<FragmentRecord, StoreError> {
        match item.get(RECORD_ATTR) {
            Some(AttributeValue::S(serialized)) => Self::decode(serialized),
            _ => Err(StoreError::Backend(format!(
                "item missing '{RECORD_ATTR}' string attribute"
            ))),
        }
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn put(&self, key: &FragmentKey, record: &FragmentRecord) -> Result<(), StoreError> {
        let serialized = Self::encode(record)?;

        debug!(key = %key, table = %self.table_name, "writing fragment record");
        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(PK_ATTR, AttributeValue::S(key.owner.to_string()))
            .item(SK_ATTR, AttributeValue::S(key.id.to_string()))
            .item(RECORD_ATTR, AttributeValue::S(serialized))
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PK_ATTR, AttributeValue::S(key.owner.to_string()))
            .key(SK_ATTR, AttributeValue::S(key.id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match result.item() {
            Some(item) => Ok(Some(Self::record_from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError> {
        let mut results = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#owner = :owner")
                .expression_attribute_names("#owner", PK_ATTR)
                .expression_attribute_values(":owner", AttributeValue::S(owner.to_string()));

            if let Some(start_key) = exclusive_start_key {
                query = query.set_exclusive_start_key(Some(start_key));
            }

            let response = query
                .send()
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

            for item in response.items() {
                results.push(Self::record_from_item(item)?);
            }

            exclusive_start_key = response.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(results)
    }

    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError> {
        // Conditional delete so a missing record surfaces as NotFound
        // instead of a silent no-op.
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(PK_ATTR, AttributeValue::S(key.owner.to_string()))
            .key(SK_ATTR, AttributeValue::S(key.id.to_string()))
            .condition_expression("attribute_exists(#owner)")
            .expression_attribute_names("#owner", PK_ATTR)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Err(StoreError::NotFound(key.canonical()))
                } else {
                    Err(StoreError::Backend(service_err.to_string()))
                }
            }
        }
    }
}

/// Build an AWS `DynamoDB` [`Client`] from the provided configuration.
///
/// Uses the standard AWS SDK environment credential chain and
/// optionally overrides the endpoint URL for local development.
pub async fn build_client(config: &DynamoConfig) -> Client {
    let mut aws_config =
        aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        aws_config = aws_config.endpoint_url(endpoint);
    }

    let sdk_config = aws_config.load().await;
    Client::new(&sdk_config)
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;
    use crate::table::create_table;

    fn test_config() -> DynamoConfig {
        DynamoConfig {
            table_name: format!("tessera_fragments_test_{}", uuid::Uuid::new_v4().simple()),
            endpoint_url: Some(
                std::env::var("DYNAMODB_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:8000".to_owned()),
            ),
            ..DynamoConfig::default()
        }
    }

    #[tokio::test]
    async fn store_conformance() {
        let config = test_config();
        let store = DynamoMetadataStore::new(&config).await;
        create_table(&store.client, &store.table_name)
            .await
            .expect("table creation should succeed");
        tessera_store::testing::run_metadata_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }
}
