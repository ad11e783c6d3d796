//! The bound virtual filesystem: one live instance per authority.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use bytes::Bytes;

use store::{ObjectClient, StoreError};

use crate::vfs::authority::{Authority, StoreUri, DELIMITER};
use crate::vfs::listing::{self, DirEntry, DirStream, EntryKind};
use crate::vfs::path::ObjectPath;
use crate::vfs::registry::RegistryState;
use crate::vfs::stream::{ObjectReader, ObjectWriter};

/// Errors surfaced by registry, path, listing, and stream operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("default error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("a filesystem is already bound to authority: {0}")]
    AlreadyExists(Authority),
    #[error("no filesystem bound to authority: {0}")]
    NotFound(Authority),
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    #[error("path has no bucket segment: {0}")]
    MissingBucket(String),
    #[error("authority mismatch: filesystem is bound to {bound}, uri names {requested}")]
    AuthorityMismatch {
        bound: Authority,
        requested: Authority,
    },
    #[error("path was issued by a different filesystem instance: {0}")]
    ForeignPath(ObjectPath),
    #[error("filesystem is closed")]
    Closed,
    #[error("is a directory: {0}")]
    IsADirectory(ObjectPath),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Shared state behind a [`KeyFs`] handle.
///
/// Owns the client handle exclusively. The registry back-reference is weak
/// so a dangling filesystem handle never keeps a dropped registry alive.
pub(crate) struct FsState {
    pub(crate) authority: Authority,
    pub(crate) client: Arc<dyn ObjectClient>,
    pub(crate) closed: AtomicBool,
    pub(crate) registry: Weak<RegistryState>,
}

/// A filesystem bound to one storage authority.
///
/// Cheap to clone; clones share identity and state. Created only through
/// [`Registry::create`](crate::vfs::Registry::create), destroyed by
/// [`close`](KeyFs::close). Every operation that needs the client handle
/// fails with [`FsError::Closed`] after close; paths issued earlier remain
/// structurally valid values.
#[derive(Clone)]
pub struct KeyFs {
    pub(crate) state: Arc<FsState>,
}

impl KeyFs {
    pub(crate) fn bind(
        authority: Authority,
        client: Arc<dyn ObjectClient>,
        registry: Weak<RegistryState>,
    ) -> Self {
        Self {
            state: Arc::new(FsState {
                authority,
                client,
                closed: AtomicBool::new(false),
                registry,
            }),
        }
    }

    pub fn authority(&self) -> &Authority {
        &self.state.authority
    }

    pub fn is_open(&self) -> bool {
        !self.state.closed.load(Ordering::SeqCst)
    }

    /// True when both handles refer to the same live instance.
    pub fn same_instance(&self, other: &KeyFs) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Transition to CLOSED and drop the registry entry. Idempotent: closing
    /// an already closed filesystem is a no-op. A stale handle closing after
    /// the authority was re-created does not evict the newer instance.
    pub fn close(&self) {
        if self.state.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.state.registry.upgrade() {
            registry.release(&self.state);
        }
        tracing::info!(authority = %self.state.authority, "filesystem closed");
    }

    /// Resolve a URI to a path bound to this filesystem.
    ///
    /// The URI's authority must be compatible with the bound authority and
    /// the path must name a bucket. Two URIs normalizing to the same segment
    /// sequence yield structurally equal paths.
    pub fn path(&self, uri: &str) -> Result<ObjectPath> {
        self.ensure_open()?;
        let parsed = StoreUri::parse(uri)?;
        if !parsed.authority().compatible_with(&self.state.authority) {
            return Err(FsError::AuthorityMismatch {
                bound: self.state.authority.clone(),
                requested: parsed.authority().clone(),
            });
        }
        if parsed.segments().is_empty() {
            return Err(FsError::MissingBucket(uri.to_string()));
        }
        Ok(ObjectPath::new(
            self.state.authority.clone(),
            parsed.into_segments(),
            Arc::downgrade(&self.state),
        ))
    }

    /// Enumerate the immediate children of `path` as a lazy stream.
    ///
    /// `filter` sees every enumerated child; rejected entries are consumed
    /// from the underlying listing but not yielded. The stream is finite and
    /// single-pass; enumerate again with a fresh call.
    pub fn list<F>(&self, path: &ObjectPath, filter: F) -> Result<DirStream>
    where
        F: FnMut(&DirEntry) -> bool + Send + 'static,
    {
        self.claim(path)?;
        listing::list(self, path, filter)
    }

    /// Open the object at `path` for reading. Fails with
    /// [`FsError::IsADirectory`] when the path denotes a bucket or a
    /// pseudo-directory.
    pub async fn read(&self, path: &ObjectPath) -> Result<ObjectReader> {
        self.claim(path)?;
        let (bucket, key) = self.object_location(path).await?;
        let stream = self.state.client.get_object(&bucket, &key).await?;
        Ok(ObjectReader::new(stream))
    }

    /// Open a buffered writer for the object at `path`. Nothing is visible
    /// to readers until [`ObjectWriter::close`] uploads the whole buffer; a
    /// writer dropped without closing uploads nothing.
    pub async fn write(&self, path: &ObjectPath) -> Result<ObjectWriter> {
        self.claim(path)?;
        let (bucket, key) = self.object_location(path).await?;
        Ok(ObjectWriter::new(
            self.state.client.clone(),
            bucket,
            key,
            path.to_string(),
        ))
    }

    /// Classify `path`: `Directory` for buckets and names with deeper keys
    /// or a directory marker, `File` for an exact object, `None` when the
    /// store holds neither. Presence of children takes precedence over a
    /// same-named object. Recomputed per call; the store is the source of
    /// truth.
    pub async fn kind(&self, path: &ObjectPath) -> Result<Option<EntryKind>> {
        self.claim(path)?;
        let Some(bucket) = path.bucket() else {
            // the store root is not an object namespace
            return Ok(None);
        };
        let key = path.key();
        if key.is_empty() {
            return Ok(Some(EntryKind::Directory));
        }
        if self.has_children(bucket, &key).await? {
            return Ok(Some(EntryKind::Directory));
        }
        let page = self
            .state
            .client
            .list_objects(bucket, &key, DELIMITER, None)
            .await?;
        if page.keys.iter().any(|k| k == &key) {
            Ok(Some(EntryKind::File))
        } else {
            Ok(None)
        }
    }

    pub async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        Ok(self.kind(path).await?.is_some())
    }

    /// Materialize a pseudo-directory by storing a zero-length marker object
    /// at `key/`.
    pub async fn create_dir(&self, path: &ObjectPath) -> Result<()> {
        self.claim(path)?;
        let Some(bucket) = path.bucket() else {
            return Err(FsError::MissingBucket(path.to_string()));
        };
        let key = path.key();
        if key.is_empty() {
            return Err(FsError::Default(anyhow::anyhow!(
                "cannot create a directory at the bucket root: {}",
                path
            )));
        }
        let marker = format!("{}/", key);
        self.state
            .client
            .put_object(bucket, &marker, Bytes::new())
            .await?;
        tracing::debug!(path = %path, "created directory marker");
        Ok(())
    }

    pub(crate) fn client(&self) -> &Arc<dyn ObjectClient> {
        &self.state.client
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(FsError::Closed)
        }
    }

    /// Every client-backed operation runs through here: the filesystem must
    /// be open and the path must have been issued by this instance.
    pub(crate) fn claim(&self, path: &ObjectPath) -> Result<()> {
        self.ensure_open()?;
        if !path.owned_by(&self.state) {
            return Err(FsError::ForeignPath(path.clone()));
        }
        Ok(())
    }

    /// Resolve a path to a readable/writable object location, rejecting the
    /// store root, bare buckets, and pseudo-directories.
    async fn object_location(&self, path: &ObjectPath) -> Result<(String, String)> {
        let Some(bucket) = path.bucket() else {
            return Err(FsError::IsADirectory(path.clone()));
        };
        let key = path.key();
        if key.is_empty() || self.has_children(bucket, &key).await? {
            return Err(FsError::IsADirectory(path.clone()));
        }
        Ok((bucket.to_string(), key))
    }

    /// True when any key (marker or deeper) exists under `key/`.
    async fn has_children(&self, bucket: &str, key: &str) -> Result<bool> {
        let prefix = format!("{}/", key);
        let mut token: Option<String> = None;
        loop {
            let page = self
                .state
                .client
                .list_objects(bucket, &prefix, DELIMITER, token.as_deref())
                .await?;
            if !page.is_empty() {
                return Ok(true);
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(false),
            }
        }
    }
}

impl std::fmt::Debug for KeyFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFs")
            .field("authority", &self.state.authority)
            .field("open", &self.is_open())
            .finish()
    }
}
