//! Streaming zip assembly for whole-group downloads.
//!
//! The archive is produced through a bounded in-memory pipe: a writer
//! task feeds blobs through the zip encoder into one end, the HTTP
//! response body reads from the other. The pipe's capacity is the only
//! buffering: the writer stalls whenever the client stops reading, and
//! a dropped reader (client disconnect) tears the writer down on its
//! next write.

use std::sync::Arc;
use std::time::Duration;

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use futures::{AsyncWriteExt, StreamExt};
use tokio::io::DuplexStream;
use tracing::{debug, warn};

use vanish_blob::BlobStore;
use vanish_core::FileGroup;

use crate::error::LifecycleError;

/// Pipe capacity between the zip encoder and the response body.
const PIPE_CAPACITY: usize = 64 * 1024;

/// A streaming zip archive of one file group.
pub struct ArchiveDownload {
    /// Suggested download filename (`files-{id}.zip`).
    pub filename: String,
    /// Read end of the archive pipe.
    pub reader: DuplexStream,
}

impl std::fmt::Debug for ArchiveDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveDownload")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

/// Start encoding `group`'s blobs into a zip stream.
///
/// Returns immediately; encoding happens in a spawned task that lives
/// exactly as long as the returned reader is being consumed.
pub(crate) fn stream_archive(
    blobs: Arc<dyn BlobStore>,
    group: FileGroup,
    remaining: Duration,
) -> ArchiveDownload {
    let filename = format!("files-{}.zip", group.id);
    let (reader, writer) = tokio::io::duplex(PIPE_CAPACITY);

    tokio::spawn(async move {
        let id = group.id.clone();
        match write_entries(blobs, &group, remaining, writer).await {
            Ok(()) => {}
            // A closed pipe usually means the client hung up; that is
            // cancellation, not failure.
            Err(LifecycleError::Archive(e)) => {
                debug!(id = %id, error = %e, "archive stream ended early");
            }
            Err(e) => {
                warn!(id = %id, error = %e, "archive stream failed");
            }
        }
    });

    ArchiveDownload { filename, reader }
}

async fn write_entries(
    blobs: Arc<dyn BlobStore>,
    group: &FileGroup,
    remaining: Duration,
    writer: DuplexStream,
) -> Result<(), LifecycleError> {
    let mut zip = ZipFileWriter::with_tokio(writer);

    for (name, path) in group.original_names.iter().zip(&group.storage_paths) {
        let mut blob = blobs
            .open(path, remaining)
            .await
            .map_err(LifecycleError::Retrieval)?;

        let entry = ZipEntryBuilder::new(name.clone().into(), Compression::Deflate);
        let mut entry_writer = zip
            .write_entry_stream(entry)
            .await
            .map_err(|e| LifecycleError::Archive(e.to_string()))?;

        while let Some(chunk) = blob.stream.next().await {
            let chunk = chunk.map_err(LifecycleError::Retrieval)?;
            entry_writer
                .write_all(&chunk)
                .await
                .map_err(|e| LifecycleError::Archive(e.to_string()))?;
        }

        entry_writer
            .close()
            .await
            .map_err(|e| LifecycleError::Archive(e.to_string()))?;
    }

    zip.close()
        .await
        .map_err(|e| LifecycleError::Archive(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_zip::base::read::mem::ZipFileReader;
    use bytes::Bytes;
    use chrono::Utc;
    use futures::AsyncReadExt as _;
    use tokio::io::AsyncReadExt as _;

    use vanish_blob_memory::MemoryBlobStore;
    use vanish_core::{FileGroupId, UploadedFile};
    use vanish_repo::FileGroupRepository;
    use vanish_repo_memory::MemoryFileGroupRepository;

    use crate::manager::LinkLifecycleManager;

    async fn collect(mut download: ArchiveDownload) -> Vec<u8> {
        let mut bytes = Vec::new();
        download.reader.read_to_end(&mut bytes).await.unwrap();
        bytes
    }

    async fn entry_names_and_contents(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let reader = ZipFileReader::new(bytes).await.unwrap();
        let mut out = Vec::new();
        for index in 0..reader.file().entries().len() {
            let name = reader.file().entries()[index]
                .filename()
                .as_str()
                .unwrap()
                .to_owned();
            let mut entry_reader = reader.reader_with_entry(index).await.unwrap();
            let mut content = Vec::new();
            entry_reader.read_to_end(&mut content).await.unwrap();
            out.push((name, content));
        }
        out
    }

    #[tokio::test]
    async fn archive_contains_all_files_in_order() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("p-a", Bytes::from_static(b"alpha")).await.unwrap();
        blobs.put("p-b", Bytes::from_static(b"bravo bravo")).await.unwrap();

        let group = FileGroup {
            id: FileGroupId::new("grp-1"),
            original_names: vec!["a.txt".into(), "b.txt".into()],
            storage_paths: vec!["p-a".into(), "p-b".into()],
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(60),
        };

        let download = stream_archive(blobs, group, Duration::from_secs(60));
        assert_eq!(download.filename, "files-grp-1.zip");

        let entries = entry_names_and_contents(collect(download).await).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a.txt");
        assert_eq!(entries[0].1, b"alpha");
        assert_eq!(entries[1].0, "b.txt");
        assert_eq!(entries[1].1, b"bravo bravo");
    }

    #[tokio::test]
    async fn archive_survives_files_larger_than_the_pipe() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let big = vec![0xA5u8; PIPE_CAPACITY * 3];
        blobs.put("p-big", Bytes::from(big.clone())).await.unwrap();

        let group = FileGroup {
            id: FileGroupId::new("grp-big"),
            original_names: vec!["big.bin".into()],
            storage_paths: vec!["p-big".into()],
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(60),
        };

        let download = stream_archive(blobs, group, Duration::from_secs(60));
        let entries = entry_names_and_contents(collect(download).await).await;
        assert_eq!(entries[0].1, big);
    }

    #[tokio::test]
    async fn manager_archive_roundtrip() {
        let repo = Arc::new(MemoryFileGroupRepository::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let manager = LinkLifecycleManager::builder()
            .repository(Arc::clone(&repo) as Arc<dyn FileGroupRepository>)
            .blob_store(Arc::clone(&blobs) as Arc<dyn vanish_blob::BlobStore>)
            .build()
            .unwrap();

        let created = manager
            .create(
                vec![
                    UploadedFile {
                        name: "first.txt".into(),
                        content_type: None,
                        data: Bytes::from_static(b"one"),
                    },
                    UploadedFile {
                        name: "second.txt".into(),
                        content_type: None,
                        data: Bytes::from_static(b"two"),
                    },
                ],
                None,
            )
            .await
            .unwrap();

        let download = manager.fetch_all_as_archive(&created.id).await.unwrap();
        assert_eq!(download.filename, format!("files-{}.zip", created.id));

        let entries = entry_names_and_contents(collect(download).await).await;
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt"]);
        assert_eq!(entries[0].1, b"one");
        assert_eq!(entries[1].1, b"two");
    }

    #[tokio::test]
    async fn archive_for_missing_group_is_not_found() {
        let repo = Arc::new(MemoryFileGroupRepository::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let manager = LinkLifecycleManager::builder()
            .repository(repo)
            .blob_store(blobs)
            .build()
            .unwrap();

        let err = manager
            .fetch_all_as_archive(&"missing".into())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound));
    }
}
