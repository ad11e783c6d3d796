//! In-memory object store with S3-style listing semantics.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use parking_lot::RwLock;

use crate::client::{ByteStream, ListPage, ObjectClient};
use crate::error::{Result, StoreError};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// An ephemeral object store held entirely in memory.
///
/// Listing collapses keys at the delimiter and paginates the way an
/// S3-compatible endpoint does, so the filesystem core's paging logic can be
/// exercised without a network. Continuation tokens encode the offset into
/// the collapsed listing and are only meaningful for an unchanged query.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    buckets: Arc<RwLock<BTreeMap<String, BTreeMap<String, Bytes>>>>,
    page_size: usize,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A single collapsed listing entry, key or common prefix.
enum Collapsed {
    Key(String),
    Prefix(String),
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a client that returns at most `page_size` entries per listing
    /// call. Panics if `page_size` is zero.
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            buckets: Arc::new(RwLock::new(BTreeMap::new())),
            page_size,
        }
    }

    /// Seed an object directly, creating the bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.into());
    }

    /// True when an object is stored at exactly this key.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .read()
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    /// Collapse the bucket's keys under `prefix` at `delimiter`, in lexical
    /// order. Keys are already sorted, so first-occurrence dedup of prefixes
    /// keeps the interleaved order sorted as well.
    fn collapse(&self, bucket: &str, prefix: &str, delimiter: &str) -> Vec<Collapsed> {
        let guard = self.buckets.read();
        let Some(objects) = guard.get(bucket) else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        let mut last_prefix: Option<String> = None;
        for key in objects.range(prefix.to_string()..).map(|(k, _)| k) {
            if !key.starts_with(prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            let collapsed_at = if delimiter.is_empty() {
                None
            } else {
                rest.find(delimiter)
            };
            match collapsed_at {
                Some(idx) => {
                    let common = key[..prefix.len() + idx + delimiter.len()].to_string();
                    if last_prefix.as_deref() != Some(common.as_str()) {
                        last_prefix = Some(common.clone());
                        entries.push(Collapsed::Prefix(common));
                    }
                }
                None => entries.push(Collapsed::Key(key.clone())),
            }
        }
        entries
    }
}

#[async_trait]
impl ObjectClient for MemoryClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage> {
        let offset = match continuation {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::InvalidToken(token.to_string()))?,
            None => 0,
        };

        let entries = self.collapse(bucket, prefix, delimiter);
        let end = entries.len().min(offset.saturating_add(self.page_size));

        let mut page = ListPage::default();
        for entry in entries.get(offset..end).unwrap_or_default() {
            match entry {
                Collapsed::Key(key) => page.keys.push(key.clone()),
                Collapsed::Prefix(common) => page.common_prefixes.push(common.clone()),
            }
        }
        if end < entries.len() {
            page.next_token = Some(end.to_string());
        }

        tracing::debug!(
            bucket,
            prefix,
            keys = page.keys.len(),
            prefixes = page.common_prefixes.len(),
            more = page.next_token.is_some(),
            "memory listing page"
        );
        Ok(page)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let data = self
            .buckets
            .read()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;
        Ok(Box::pin(stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        tracing::debug!(bucket, key, size = data.len(), "storing object");
        self.insert(bucket, key, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn read_all(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let client = MemoryClient::new();
        client
            .put_object("bucketA", "file1", Bytes::from_static(b"contents"))
            .await
            .unwrap();

        let stream = client.get_object("bucketA", "file1").await.unwrap();
        assert_eq!(read_all(stream).await, b"contents");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let client = MemoryClient::new();
        let err = match client.get_object("bucketA", "nope").await {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delimiter_collapse() {
        let client = MemoryClient::new();
        client.insert("bucketA", "file1", "x");
        client.insert("bucketA", "dir1/a", "x");
        client.insert("bucketA", "dir1/b", "x");

        let page = client
            .list_objects("bucketA", "", "/", None)
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["file1"]);
        assert_eq!(page.common_prefixes, vec!["dir1/"]);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_prefix_query() {
        let client = MemoryClient::new();
        client.insert("bucketA", "dir1/a", "x");
        client.insert("bucketA", "dir1/sub/b", "x");
        client.insert("bucketA", "dir2/c", "x");

        let page = client
            .list_objects("bucketA", "dir1/", "/", None)
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["dir1/a"]);
        assert_eq!(page.common_prefixes, vec!["dir1/sub/"]);
    }

    #[tokio::test]
    async fn test_marker_and_children_both_surface() {
        let client = MemoryClient::new();
        client.insert("bucketA", "d", "x");
        client.insert("bucketA", "d/x", "x");

        let page = client
            .list_objects("bucketA", "", "/", None)
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["d"]);
        assert_eq!(page.common_prefixes, vec!["d/"]);
    }

    #[tokio::test]
    async fn test_pagination() {
        let client = MemoryClient::with_page_size(2);
        for name in ["a", "b", "c", "d", "e"] {
            client.insert("bucketA", name, "x");
        }

        let mut seen = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = client
                .list_objects("bucketA", "", "/", token.as_deref())
                .await
                .unwrap();
            pages += 1;
            seen.extend(page.keys);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(pages, 3);
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_bad_token() {
        let client = MemoryClient::new();
        client.insert("bucketA", "a", "x");
        let err = client
            .list_objects("bucketA", "", "/", Some("not-a-token"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_unknown_bucket_lists_empty() {
        let client = MemoryClient::new();
        let page = client
            .list_objects("missing", "", "/", None)
            .await
            .unwrap();
        assert!(page.is_empty());
        assert!(page.next_token.is_none());
    }
}
