//! Shared fixtures for filesystem tests.
//!
//! Registries here are wired to a [`MemoryClient`] with a deliberately small
//! page size so every listing test also exercises pagination.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit;
//!
//! #[tokio::test]
//! async fn test_listing() -> anyhow::Result<()> {
//!     let (fs, client, _registry) = testkit::memory_fs("s3://endpoint.test/");
//!     client.insert("bucketA", "file1", "data");
//!
//!     let path = fs.path("s3://endpoint.test/bucketA")?;
//!     let children = testkit::collect(&fs, &path).await?;
//!     assert_eq!(children.len(), 1);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::TryStreamExt;

use store::{MemoryClient, ObjectClient};

use crate::credentials::ConfigMap;
use crate::vfs::{DirEntry, KeyFs, ObjectPath, Registry, Result};

/// Listing page size used by testkit clients; small enough that a handful of
/// objects spans several pages.
pub const TEST_PAGE_SIZE: usize = 2;

/// A registry whose factory hands every filesystem the same shared
/// in-memory client.
pub fn memory_registry() -> (Registry, MemoryClient) {
    let client = MemoryClient::with_page_size(TEST_PAGE_SIZE);
    let shared = client.clone();
    let registry = Registry::new(move |_authority, _credentials| {
        Arc::new(shared.clone()) as Arc<dyn ObjectClient>
    });
    (registry, client)
}

/// A freshly created filesystem for `uri`, plus the client to seed objects
/// into and the registry keeping the instance alive.
pub fn memory_fs(uri: &str) -> (KeyFs, MemoryClient, Registry) {
    let (registry, client) = memory_registry();
    let fs = registry
        .create(uri, &ConfigMap::new())
        .expect("create filesystem for testkit uri");
    (fs, client, registry)
}

/// Drain an unfiltered listing into a vector.
pub async fn collect(fs: &KeyFs, path: &ObjectPath) -> Result<Vec<DirEntry>> {
    fs.list(path, |_| true)?.try_collect().await
}
