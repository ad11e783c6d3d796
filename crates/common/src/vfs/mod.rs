//! Hierarchical filesystem emulation over a flat object store
//!
//! The store knows only buckets and slash-delimited keys. This module layers
//! directory semantics on top of that namespace:
//!
//! - **[`Authority`]**: identity of a storage endpoint; at most one live
//!   filesystem per authority
//! - **[`Registry`]**: the authority-keyed table with create/lookup/close
//!   lifecycle
//! - **[`KeyFs`]**: a bound filesystem instance owning one client handle,
//!   factory for paths scoped to itself
//! - **[`ObjectPath`]**: normalized absolute path, bucket first, equality
//!   structural
//! - **[`DirEntry`]**: emulated directory children derived per listing call
//!   from prefix queries — never cached, the store is the source of truth
//! - **[`ObjectReader`]**/**[`ObjectWriter`]**: content streams that refuse
//!   pseudo-directory targets
//!
//! # Pseudo-directories
//!
//! A directory here is a naming convention: a segment with deeper keys
//! sharing it as a prefix, or a zero-length `key/` marker object. Listing
//! collapses raw keys at the delimiter into immediate children, each name
//! surfacing exactly once; presence of children takes precedence over a
//! same-named object.

mod authority;
mod filesystem;
mod listing;
mod path;
mod registry;
mod stream;

pub use authority::{Authority, StoreUri, DELIMITER, SCHEME_PREFIX};
pub use filesystem::{FsError, KeyFs, Result};
pub use listing::{DirEntry, DirStream, EntryKind};
pub use path::ObjectPath;
pub use registry::{ClientFactory, Registry};
pub use stream::{ObjectReader, ObjectWriter};
