use bytes::Bytes;
use futures::stream::BoxStream;

/// A streaming read handle for one stored blob.
///
/// The stream yields the blob's bytes in order, pulling from the
/// backend only as fast as the consumer reads; nothing buffers the
/// whole file. Dropping the reader aborts the underlying transfer.
pub struct BlobReader {
    /// MIME content type reported by the backend, if known.
    pub content_type: Option<String>,
    /// Total size in bytes, if known ahead of time.
    pub content_length: Option<u64>,
    /// The blob's bytes.
    pub stream: BoxStream<'static, Result<Bytes, crate::BlobError>>,
}

impl std::fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
