//! Stream access to object content.
//!
//! Reads pull content lazily from the client and release the transfer when
//! dropped. Writes buffer locally and upload the complete buffer as a single
//! put on close; readers see nothing until the close completes, and a writer
//! abandoned without closing uploads nothing. Concurrent writers to the same
//! path are last-writer-wins at upload completion — no locking here.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use store::{ByteStream, ObjectClient, StoreError};

use crate::vfs::filesystem::Result;

/// A read stream over one object's content.
///
/// Yields content chunks in order. Each handle is for a single logical
/// caller; open further readers for concurrent access.
pub struct ObjectReader {
    inner: ByteStream,
}

impl ObjectReader {
    pub(crate) fn new(inner: ByteStream) -> Self {
        Self { inner }
    }

    /// Drain the stream into one buffer.
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.inner.next().await {
            let chunk = chunk.map_err(StoreError::Io)?;
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}

impl Stream for ObjectReader {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// A buffered write stream for one object.
///
/// Bytes accumulate locally; [`close`](ObjectWriter::close) performs the one
/// atomic upload. Dropping the writer without closing discards the buffer —
/// there is no partial or implicit flush.
pub struct ObjectWriter {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    key: String,
    display: String,
    buf: Vec<u8>,
}

impl ObjectWriter {
    pub(crate) fn new(
        client: Arc<dyn ObjectClient>,
        bucket: String,
        key: String,
        display: String,
    ) -> Self {
        Self {
            client,
            bucket,
            key,
            display,
            buf: Vec::new(),
        }
    }

    pub fn write(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered so far.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Upload the complete buffered content as a single put.
    pub async fn close(self) -> Result<()> {
        let size = self.buf.len();
        self.client
            .put_object(&self.bucket, &self.key, Bytes::from(self.buf))
            .await?;
        tracing::debug!(path = %self.display, size, "uploaded object");
        Ok(())
    }
}
