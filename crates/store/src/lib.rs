//! Object-store client boundary for keyfs.
//!
//! keyfs emulates a hierarchical filesystem on top of flat, key-addressed
//! object stores. This crate defines the capability set the filesystem core
//! consumes — prefix listing, content get, content put — and ships two
//! implementations:
//!
//! - [`MemoryClient`]: an in-memory store with S3-style delimiter collapse
//!   and configurable page size, used by the test suites and embeddable by
//!   callers that want an ephemeral store.
//! - [`BackendClient`]: an adapter over the `object_store` crate, selecting
//!   memory, local-filesystem, or S3-compatible backends via
//!   [`ClientConfig`].
//!
//! Transport concerns (retries, backoff, timeouts, pagination transport) are
//! the client implementation's responsibility; the core treats continuation
//! tokens opaquely and never retries.

mod client;
mod error;
mod memory;
mod storage;

pub use client::{ByteStream, ListPage, ObjectClient};
pub use error::{Result, StoreError};
pub use memory::MemoryClient;
pub use storage::{BackendClient, ClientConfig};
