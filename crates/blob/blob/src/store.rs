use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;
use crate::types::BlobReader;

/// Pluggable blob storage backend for uploaded file bytes.
///
/// Implementors provide the actual storage mechanism (in-memory,
/// filesystem, Supabase Storage). Paths returned by [`put`](Self::put)
/// are opaque to callers and are the only handle to a stored blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under the given key and return its storage path.
    ///
    /// Keys are caller-derived (sanitized, uniqueness-prefixed) and are
    /// never reused, so overwrites do not occur in practice; a backend
    /// that receives a duplicate key may overwrite.
    async fn put(&self, key: &str, data: Bytes) -> Result<String, BlobError>;

    /// Produce a time-limited retrieval URL for a stored blob.
    ///
    /// The URL grants read access for `ttl` without further
    /// authentication. Backends without a signing mechanism return
    /// [`BlobError::SignedUrlUnsupported`].
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError>;

    /// Open a stored blob for streaming reads.
    ///
    /// This is the retrieval capability consumed by the proxy download
    /// path. The capability is time-boxed: for remote backends it is
    /// backed by a signed URL valid for `ttl`, so it can never outlive
    /// the metadata record it was derived from.
    async fn open(&self, path: &str, ttl: Duration) -> Result<BlobReader, BlobError>;

    /// Delete a stored blob.
    ///
    /// Idempotent: deleting a missing path succeeds. The reaper relies
    /// on this to be safe under concurrent invocation and retries.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}

impl std::fmt::Debug for dyn BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlobStore")
    }
}
