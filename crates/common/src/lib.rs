/**
 * Credential resolution for filesystem creation.
 *  Explicit configuration first, then the properties
 *  source, then anonymous access.
 */
pub mod credentials;
/**
 * Shared fixtures for tests: registries wired to
 *  in-memory stores with small listing pages.
 */
pub mod testkit;
/**
 * Core types that present a hierarchical filesystem
 *  over a flat, key-addressed object store: paths,
 *  the registry and filesystem lifecycle, directory
 *  emulation, and stream access.
 */
pub mod vfs;

pub mod prelude {
    pub use crate::credentials::{ConfigMap, Credentials};
    pub use crate::vfs::{
        Authority, DirEntry, EntryKind, FsError, KeyFs, ObjectPath, Registry,
    };
}
