//! The abstract client capability set consumed by the filesystem core.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;

/// A lazily pulled stream of object content chunks.
///
/// Dropping the stream releases the underlying transfer.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Raw object keys beginning with the queried prefix, in store order.
    pub keys: Vec<String>,
    /// Key prefixes collapsed at the queried delimiter, each ending with it.
    pub common_prefixes: Vec<String>,
    /// Opaque continuation token; `None` on the final page.
    pub next_token: Option<String>,
}

impl ListPage {
    /// True when the page carries neither keys nor collapsed prefixes.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.common_prefixes.is_empty()
    }
}

/// Capability set of a flat object store: prefix listing, content get,
/// content put.
///
/// Implementations own all network concerns. Callers hand continuation
/// tokens back verbatim and must not interpret them.
#[async_trait]
pub trait ObjectClient: Send + Sync + 'static {
    /// List keys under `prefix` in `bucket`, collapsing at `delimiter`.
    ///
    /// `continuation` must be a token returned by a previous call with the
    /// same bucket, prefix, and delimiter.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage>;

    /// Open the content of the object at `key` as a byte stream.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream>;

    /// Store `data` as the complete content of the object at `key`,
    /// replacing any previous content.
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;
}
