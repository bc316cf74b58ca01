//! Filesystem [`BlobStore`] backend.
//!
//! Stores each blob as a regular file directly under a root directory.
//! Keys are flat names (the sanitizer upstream never produces path
//! separators); anything that looks like directory structure is
//! rejected rather than resolved.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;

use vanish_blob::{BlobError, BlobReader, BlobStore};

/// Blob store rooted at a local directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The root directory blobs are stored under.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        if path.is_empty()
            || path.contains('/')
            || path.contains('\\')
            || path == "."
            || path == ".."
        {
            return Err(BlobError::Storage(format!(
                "invalid blob path: {path:?}"
            )));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, BlobError> {
        let target = self.resolve(key)?;
        fs::write(&target, &data).await?;
        Ok(key.to_owned())
    }

    async fn signed_url(&self, _path: &str, _ttl: Duration) -> Result<String, BlobError> {
        Err(BlobError::SignedUrlUnsupported)
    }

    async fn open(&self, path: &str, _ttl: Duration) -> Result<BlobReader, BlobError> {
        let target = self.resolve(path)?;
        let file = match fs::File::open(&target).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlobError::NotFound(path.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata().await?.len();

        let stream = ReaderStream::new(file).map(|chunk| chunk.map_err(BlobError::from));
        Ok(BlobReader {
            content_type: None,
            content_length: Some(len),
            stream: Box::pin(stream),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            // Already gone: idempotent success.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(mut reader: BlobReader) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = reader.stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn put_then_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::create(dir.path()).await.unwrap();

        let path = store
            .put("1700000000000-abc123-notes.txt", Bytes::from_static(b"on disk"))
            .await
            .unwrap();
        let reader = store.open(&path, Duration::from_secs(60)).await.unwrap();
        assert_eq!(reader.content_length, Some(7));
        assert_eq!(read_all(reader).await, b"on disk");
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::create(dir.path()).await.unwrap();
        let err = store
            .open("missing.bin", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::create(dir.path()).await.unwrap();

        store.put("gone.bin", Bytes::from_static(b"x")).await.unwrap();
        store.delete("gone.bin").await.unwrap();
        store.delete("gone.bin").await.unwrap();
        store.delete("never-existed.bin").await.unwrap();
    }

    #[tokio::test]
    async fn directory_structure_in_paths_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::create(dir.path()).await.unwrap();

        for bad in ["../escape", "a/b", "a\\b", "..", ""] {
            let err = store.put(bad, Bytes::from_static(b"x")).await.unwrap_err();
            assert!(matches!(err, BlobError::Storage(_)), "path {bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn create_makes_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("blobs").join("deep");
        let store = FsBlobStore::create(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }
}
