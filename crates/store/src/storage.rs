//! Backend adapter over the `object_store` crate (S3/MinIO/local/memory).

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as BackendPath;
use object_store::ObjectStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::client::{ByteStream, ListPage, ObjectClient};
use crate::error::{Result, StoreError};

/// Configuration for the storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage, one directory per bucket
    Local {
        /// Path to the storage root
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID; unsigned requests when absent
        access_key: Option<String>,
        /// Secret access key; unsigned requests when absent
        secret_key: Option<String>,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

/// [`ObjectClient`] implementation over `object_store` backends.
///
/// One backend handle is built lazily per bucket and cached. Listing maps to
/// `list_with_delimiter`, which resolves transport pagination internally, so
/// pages returned here never carry a continuation token.
///
/// Backend paths normalize trailing-slash keys away, so zero-length `key/`
/// directory markers are stored at the bare key; directory inference from
/// real children is unaffected.
pub struct BackendClient {
    config: ClientConfig,
    buckets: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        if let Some(store) = self.buckets.lock().get(bucket) {
            return Ok(store.clone());
        }
        let store = self.build(bucket)?;
        Ok(self
            .buckets
            .lock()
            .entry(bucket.to_string())
            .or_insert(store)
            .clone())
    }

    fn build(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match &self.config {
            ClientConfig::Memory => Arc::new(InMemory::new()),

            ClientConfig::Local { path } => {
                let root = path.join(bucket);
                std::fs::create_dir_all(&root)?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(&root)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }

            ClientConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                region,
            } => {
                let mut builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                builder = match (access_key, secret_key) {
                    (Some(access), Some(secret)) => builder
                        .with_access_key_id(access)
                        .with_secret_access_key(secret),
                    // no credentials: unsigned (anonymous) requests
                    _ => builder.with_skip_signature(true),
                };

                Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }
        };

        tracing::debug!(bucket, "built storage backend");
        Ok(store)
    }
}

#[async_trait]
impl ObjectClient for BackendClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        _delimiter: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage> {
        // list_with_delimiter drains transport pagination itself; a token
        // can only reach us if the caller invented one.
        if let Some(token) = continuation {
            return Err(StoreError::InvalidToken(token.to_string()));
        }

        let store = self.store_for(bucket)?;
        let backend_prefix = match prefix.trim_end_matches('/') {
            "" => None,
            trimmed => Some(BackendPath::from(trimmed)),
        };
        let listing = store.list_with_delimiter(backend_prefix.as_ref()).await?;

        Ok(ListPage {
            keys: listing
                .objects
                .into_iter()
                .map(|meta| meta.location.to_string())
                .collect(),
            common_prefixes: listing
                .common_prefixes
                .into_iter()
                .map(|p| format!("{}/", p))
                .collect(),
            next_token: None,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let store = self.store_for(bucket)?;
        let location = BackendPath::from(key);
        match store.get(&location).await {
            Ok(result) => Ok(result
                .into_stream()
                .map(|chunk| chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e)))
                .boxed()),
            Err(object_store::Error::NotFound { .. }) => Err(StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        let store = self.store_for(bucket)?;
        let location = BackendPath::from(key);
        tracing::debug!(bucket, key, size = data.len(), "uploading object");
        store.put(&location, data.into()).await?;
        Ok(())
    }
}
