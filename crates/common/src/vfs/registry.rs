//! Authority-keyed table of live filesystem instances.
//!
//! The registry is an explicit, injectable object: it owns the table, the
//! client factory, and the fallback properties source. No ambient global
//! state. Create/close mutations are serialized by one mutex over the
//! table, so two concurrent creates for the same authority resolve to
//! exactly one winner.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use store::ObjectClient;

use crate::credentials::{ConfigMap, Credentials};
use crate::vfs::authority::{Authority, StoreUri};
use crate::vfs::filesystem::{FsError, FsState, KeyFs, Result};

/// Builds the client a new filesystem gets bound to. Construction only; no
/// network access happens here.
pub type ClientFactory =
    Box<dyn Fn(&Authority, &Credentials) -> Arc<dyn ObjectClient> + Send + Sync>;

pub(crate) struct RegistryState {
    pub(crate) entries: Mutex<HashMap<Authority, KeyFs>>,
    factory: ClientFactory,
    properties: ConfigMap,
}

impl RegistryState {
    /// Remove the entry for a closing instance, but only when the table
    /// still points at that exact instance.
    pub(crate) fn release(&self, closing: &Arc<FsState>) {
        let mut entries = self.entries.lock();
        let registered = entries
            .get(&closing.authority)
            .is_some_and(|fs| Arc::ptr_eq(&fs.state, closing));
        if registered {
            entries.remove(&closing.authority);
        }
    }
}

/// Process-wide (or narrower — the scope is the caller's choice) table
/// mapping each storage authority to at most one live [`KeyFs`].
pub struct Registry {
    state: Arc<RegistryState>,
}

impl Registry {
    /// A registry with no properties source; credentials resolve from the
    /// explicit configuration or fall through to anonymous.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Authority, &Credentials) -> Arc<dyn ObjectClient> + Send + Sync + 'static,
    {
        Self::with_properties(factory, ConfigMap::new())
    }

    /// A registry with a properties source consulted when the explicit
    /// configuration does not supply both keys.
    pub fn with_properties<F>(factory: F, properties: ConfigMap) -> Self
    where
        F: Fn(&Authority, &Credentials) -> Arc<dyn ObjectClient> + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(RegistryState {
                entries: Mutex::new(HashMap::new()),
                factory: Box::new(factory),
                properties,
            }),
        }
    }

    /// Bind a new filesystem to the authority in `uri`.
    ///
    /// Fails with [`FsError::AlreadyExists`] while an instance for that
    /// authority is live. After a close, a subsequent create succeeds and
    /// yields a new, distinct instance.
    pub fn create(&self, uri: &str, env: &ConfigMap) -> Result<KeyFs> {
        let authority = StoreUri::parse(uri)?.authority().clone();

        let mut entries = self.state.entries.lock();
        if entries.contains_key(&authority) {
            return Err(FsError::AlreadyExists(authority));
        }

        let credentials = Credentials::resolve(env, &self.state.properties);
        let client = (self.state.factory)(&authority, &credentials);
        let fs = KeyFs::bind(authority.clone(), client, Arc::downgrade(&self.state));
        entries.insert(authority.clone(), fs.clone());

        tracing::info!(
            authority = %authority,
            anonymous = credentials.is_anonymous(),
            "filesystem created"
        );
        Ok(fs)
    }

    /// Close a filesystem. Equivalent to [`KeyFs::close`]; idempotent, and a
    /// no-op for an instance this registry no longer tracks.
    pub fn close(&self, fs: &KeyFs) {
        fs.close();
    }

    /// The live filesystem for the authority in `uri`, or
    /// [`FsError::NotFound`].
    pub fn lookup(&self, uri: &str) -> Result<KeyFs> {
        let authority = StoreUri::parse(uri)?.authority().clone();
        self.state
            .entries
            .lock()
            .get(&authority)
            .cloned()
            .ok_or(FsError::NotFound(authority))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.state.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .finish()
    }
}
