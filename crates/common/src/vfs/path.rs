//! The path model: a normalized absolute path over the flat namespace.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::vfs::authority::{Authority, SCHEME_PREFIX};
use crate::vfs::filesystem::FsState;

/// A normalized absolute path: ordered segments, first segment the bucket.
///
/// Zero segments denote the store root — a valid value, but not enumerable
/// as a directory of objects and never issued by path resolution. Paths are
/// immutable values; equality, ordering, and hashing are structural over the
/// segment sequence and independent of the originating filesystem instance.
/// The filesystem reference is weak and used for identity checks only:
/// operations requiring a bound client reject paths issued by a different
/// instance.
#[derive(Debug, Clone)]
pub struct ObjectPath {
    authority: Authority,
    segments: Vec<String>,
    owner: Weak<FsState>,
}

impl ObjectPath {
    pub(crate) fn new(
        authority: Authority,
        segments: Vec<String>,
        owner: Weak<FsState>,
    ) -> Self {
        Self {
            authority,
            segments,
            owner,
        }
    }

    /// The authority the issuing filesystem was bound to.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// True for the store root (no bucket selected).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The bucket name, absent only at the store root.
    pub fn bucket(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// The flat key under the bucket: segments after the bucket joined with
    /// the delimiter. Empty for the bucket itself.
    pub fn key(&self) -> String {
        self.segments.get(1..).unwrap_or_default().join("/")
    }

    /// The key rendered as a listing prefix: trailing delimiter when any key
    /// segments exist, empty for the bucket root.
    pub(crate) fn key_prefix(&self) -> String {
        let key = self.key();
        if key.is_empty() {
            key
        } else {
            format!("{}/", key)
        }
    }

    /// The final segment, absent at the store root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The containing path, absent at the store root.
    pub fn parent(&self) -> Option<ObjectPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            authority: self.authority.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            owner: self.owner.clone(),
        })
    }

    /// Append one or more segments; slashes in `name` split into segments,
    /// empty segments are dropped.
    pub fn join(&self, name: &str) -> ObjectPath {
        let mut segments = self.segments.clone();
        segments.extend(
            name.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Self {
            authority: self.authority.clone(),
            segments,
            owner: self.owner.clone(),
        }
    }

    /// Render the full address, suitable for re-parsing through the issuing
    /// filesystem.
    pub fn to_uri(&self) -> String {
        format!(
            "{}{}/{}",
            SCHEME_PREFIX,
            self.authority.uri_host(),
            self.segments.join("/")
        )
    }

    /// Identity check against a filesystem's state.
    pub(crate) fn owned_by(&self, state: &Arc<FsState>) -> bool {
        self.owner.as_ptr() == Arc::as_ptr(state)
    }
}

impl PartialEq for ObjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for ObjectPath {}

impl PartialOrd for ObjectPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl Hash for ObjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
