//! Directory emulation over prefix listings.
//!
//! The flat store has no directories; children of a path are inferred from
//! one or more prefix+delimiter listing calls. Pages are fetched on demand
//! as the stream is consumed, with at most one page resident. Within a page,
//! candidates pass through a sorted grouping map (the store commonly returns
//! keys sorted, but this is not assumed); across a page boundary only the
//! final candidate is held back, in case the next page's deeper keys upgrade
//! it from file to directory.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use futures::stream::{self, BoxStream};

use store::ObjectClient;

use crate::vfs::authority::DELIMITER;
use crate::vfs::filesystem::{FsError, KeyFs, Result};
use crate::vfs::path::ObjectPath;

/// Classification of an enumerated child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// A finite, single-pass stream of directory children. Dropping it early
/// releases the paging cursor.
pub type DirStream = BoxStream<'static, Result<DirEntry>>;

struct ListCursor<F> {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    prefix: String,
    token: Option<String>,
    exhausted: bool,
    ready: VecDeque<DirEntry>,
    held: Option<DirEntry>,
    filter: F,
}

pub(crate) fn list<F>(fs: &KeyFs, path: &ObjectPath, filter: F) -> Result<DirStream>
where
    F: FnMut(&DirEntry) -> bool + Send + 'static,
{
    let Some(bucket) = path.bucket() else {
        // the store root is not enumerable as a directory of objects
        return Err(FsError::MissingBucket(path.to_string()));
    };

    let cursor = ListCursor {
        client: fs.client().clone(),
        bucket: bucket.to_string(),
        prefix: path.key_prefix(),
        token: None,
        exhausted: false,
        ready: VecDeque::new(),
        held: None,
        filter,
    };

    let entries = stream::try_unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(entry) = cursor.ready.pop_front() {
                if (cursor.filter)(&entry) {
                    return Ok(Some((entry, cursor)));
                }
                continue;
            }
            if cursor.exhausted {
                match cursor.held.take() {
                    Some(entry) if (cursor.filter)(&entry) => {
                        return Ok(Some((entry, cursor)));
                    }
                    Some(_) => continue,
                    None => return Ok(None),
                }
            }
            cursor.fetch_page().await?;
        }
    });
    Ok(Box::pin(entries))
}

impl<F> ListCursor<F> {
    /// Pull the next page and fold it into candidate children.
    ///
    /// A raw key's first segment past the prefix is the candidate name: a
    /// delimiter-collapsed common prefix or a key with deeper segments is a
    /// directory, an exact key a file, and a directory wins over a
    /// same-named file. A marker key equal to the prefix itself describes
    /// the listed directory, not a child.
    async fn fetch_page(&mut self) -> Result<()> {
        let page = self
            .client
            .list_objects(&self.bucket, &self.prefix, DELIMITER, self.token.as_deref())
            .await?;
        let final_page = page.next_token.is_none();
        tracing::debug!(
            bucket = %self.bucket,
            prefix = %self.prefix,
            keys = page.keys.len(),
            prefixes = page.common_prefixes.len(),
            final_page,
            "fetched listing page"
        );

        let mut candidates: BTreeMap<String, EntryKind> = BTreeMap::new();
        for common in &page.common_prefixes {
            let Some(rest) = common.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            let name = rest.split(DELIMITER).next().unwrap_or("");
            if !name.is_empty() {
                candidates.insert(name.to_string(), EntryKind::Directory);
            }
        }
        for key in &page.keys {
            let Some(rest) = key.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.find(DELIMITER) {
                // the client left the delimiter uncollapsed; group it here
                Some(idx) => {
                    let name = &rest[..idx];
                    if !name.is_empty() {
                        candidates.insert(name.to_string(), EntryKind::Directory);
                    }
                }
                None => {
                    candidates
                        .entry(rest.to_string())
                        .or_insert(EntryKind::File);
                }
            }
        }

        if let Some(held) = self.held.take() {
            if let Some(kind) = candidates.get_mut(&held.name) {
                if held.kind.is_dir() {
                    *kind = EntryKind::Directory;
                }
            } else if candidates.is_empty() && !final_page {
                // empty interim page; a later page may still upgrade it
                self.held = Some(held);
            } else {
                self.ready.push_back(held);
            }
        }

        let mut drained: Vec<DirEntry> = candidates
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect();
        if !final_page {
            if let Some(last) = drained.pop() {
                self.held = Some(last);
            }
        }
        self.ready.extend(drained);

        self.token = page.next_token;
        self.exhausted = final_page;
        Ok(())
    }
}
