//! Storage endpoint identity and address parsing.
//!
//! Addresses follow `s3://[endpoint]/bucket[/segment]*`. An empty endpoint
//! names the default authority, which is a distinct identity of its own —
//! not a wildcard over all endpoints — except during path resolution, where
//! the default authority is compatible with any other.

use std::fmt;

use crate::vfs::filesystem::{FsError, Result};

/// URI scheme prefix for every address this core resolves.
pub const SCHEME_PREFIX: &str = "s3://";

/// Delimiter separating key segments in the flat namespace.
pub const DELIMITER: &str = "/";

/// Identity of a storage endpoint: its host string, or default when absent.
///
/// Two authorities are equal iff their endpoint strings are equal; the
/// default authority equals only itself. Immutable once a filesystem is
/// bound to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Authority {
    endpoint: Option<String>,
}

impl Authority {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::from_endpoint(Some(endpoint.into()))
    }

    /// An empty endpoint string collapses to the default authority.
    pub fn from_endpoint(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.filter(|e| !e.is_empty()),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.endpoint.is_none()
    }

    /// Path-resolution compatibility: a mismatch needs two distinct,
    /// non-default endpoints. The default authority accepts any address and
    /// an address without a host resolves against any filesystem.
    pub fn compatible_with(&self, other: &Authority) -> bool {
        self.is_default() || other.is_default() || self == other
    }

    /// The endpoint as it appears between the scheme and the path.
    pub(crate) fn uri_host(&self) -> &str {
        self.endpoint.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Some(endpoint) => write!(f, "{}", endpoint),
            None => write!(f, "default"),
        }
    }
}

/// A parsed `s3://` address: authority plus normalized path segments.
///
/// Normalization collapses the leading `/`, drops empty trailing and
/// interior segments, and rejects an empty leading segment before further
/// segments (a path that skips the bucket position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUri {
    authority: Authority,
    segments: Vec<String>,
}

impl StoreUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(SCHEME_PREFIX)
            .ok_or_else(|| FsError::InvalidUri(uri.to_string()))?;

        let (host, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };
        let authority = Authority::from_endpoint(Some(host.to_string()));

        let mut raw: Vec<&str> = path.split('/').collect();
        while raw.last() == Some(&"") {
            raw.pop();
        }
        if raw.first() == Some(&"") {
            return Err(FsError::MissingBucket(uri.to_string()));
        }
        let segments = raw
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            authority,
            segments,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }
}
