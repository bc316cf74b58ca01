//! In-memory [`BlobStore`] backend.
//!
//! Holds all blobs in a process-local map. Intended for tests and
//! single-process deployments where durability is not required: blobs
//! vanish with the process, which for an ephemeral store is sometimes
//! exactly the point.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::stream;

use vanish_blob::{BlobError, BlobReader, BlobStore};

/// `DashMap`-backed blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Whether a blob exists at the given path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, BlobError> {
        self.blobs.insert(key.to_owned(), data);
        Ok(key.to_owned())
    }

    async fn signed_url(&self, _path: &str, _ttl: Duration) -> Result<String, BlobError> {
        Err(BlobError::SignedUrlUnsupported)
    }

    async fn open(&self, path: &str, _ttl: Duration) -> Result<BlobReader, BlobError> {
        let data = self
            .blobs
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BlobError::NotFound(path.to_owned()))?;

        let len = data.len() as u64;
        let chunk: Result<Bytes, BlobError> = Ok(data);
        Ok(BlobReader {
            content_type: None,
            content_length: Some(len),
            stream: Box::pin(stream::iter([chunk])),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.blobs.remove(path);
        Ok(())
    }
}
