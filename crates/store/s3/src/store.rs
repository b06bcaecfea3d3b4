use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use tessera_store::blob::BlobStore;
use tessera_store::error::StoreError;
use tessera_store::key::FragmentKey;

use crate::config::S3Config;

/// S3-backed implementation of [`BlobStore`].
///
/// Objects are stored under the key `{owner}/{id}`. The backend's
/// `NoSuchKey` read signal is normalized to [`StoreError::NotFound`],
/// matching the in-memory backend's behavior. S3 deletes are already
/// idempotent, which satisfies the already-absent tolerance the
/// contract requires.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a new `S3BlobStore` from the provided configuration.
    ///
    /// Loads AWS credentials and configuration from the environment and
    /// optionally overrides the endpoint URL for local development.
    pub async fn new(config: &S3Config) -> Self {
        let client = build_client(config).await;
        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

    /// Create an `S3BlobStore` with a pre-built client.
    #[must_use]
    pub fn from_client(client: Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = %key, size = data.len(), "uploading fragment payload");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.canonical())
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &FragmentKey) -> Result<Bytes, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.canonical())
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(StoreError::NotFound(key.canonical()));
                }
                return Err(StoreError::Backend(service_err.to_string()));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to read object body: {e}")))?
            .into_bytes();

        Ok(data)
    }

    async fn delete(&self, key: &FragmentKey) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = %key, "deleting fragment payload");
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key.canonical())
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

/// Build an AWS S3 [`Client`] from the provided configuration.
///
/// Uses the standard AWS SDK environment credential chain, optionally
/// overriding the endpoint URL and enabling path-style addressing for
/// local S3 stand-ins.
pub async fn build_client(config: &S3Config) -> Client {
    let mut aws_config =
        aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        aws_config = aws_config.endpoint_url(endpoint);
    }

    let sdk_config = aws_config.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.force_path_style)
        .build();

    Client::from_conf(s3_config)
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    async fn test_store() -> S3BlobStore {
        let config = S3Config::new(
            std::env::var("S3_BUCKET").unwrap_or_else(|_| "tessera-fragments-test".to_owned()),
            "us-east-1",
        )
        .with_endpoint_url(
            std::env::var("S3_ENDPOINT").unwrap_or_else(|_| "http://localhost:4566".to_owned()),
        )
        .with_path_style();

        let store = S3BlobStore::new(&config).await;
        // Best-effort bucket creation for local stand-ins.
        let _ = store
            .client
            .create_bucket()
            .bucket(&store.bucket)
            .send()
            .await;
        store
    }

    #[tokio::test]
    async fn store_conformance() {
        let store = test_store().await;
        tessera_store::testing::run_blob_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }
}
