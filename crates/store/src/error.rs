//! Error types for object-store clients.

/// Errors surfaced by an [`ObjectClient`](crate::ObjectClient).
///
/// Transient transport failures propagate unchanged through these variants;
/// retry and backoff belong to the client implementation, never to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Catch-all for client-internal failures
    #[error("store error: {0}")]
    Default(#[from] anyhow::Error),

    /// Backend error from the object_store crate
    #[error("object storage error: {0}")]
    Backend(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No object stored at this key
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Continuation token not issued by this client
    #[error("invalid continuation token: {0}")]
    InvalidToken(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, StoreError>;
