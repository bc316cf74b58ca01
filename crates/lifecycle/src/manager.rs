use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use tracing::{info, warn};

use vanish_blob::{BlobError, BlobStore};
use vanish_core::{
    FileGroupId, NewFileGroup, ResolveOutcome, UploadLimits, UploadedFile, storage_key,
};
use vanish_repo::FileGroupRepository;

use crate::archive::{self, ArchiveDownload};
use crate::error::LifecycleError;
use crate::metrics::LifecycleMetrics;
use crate::notifier::{ExpiryNotifier, SweepNotifier};

/// The result of a successful create: the link token and its deadline.
#[derive(Debug, Clone)]
pub struct CreatedGroup {
    /// The new group's id, which is the public link token.
    pub id: FileGroupId,
    /// When the group expires.
    pub expires_at: DateTime<Utc>,
}

/// A streaming single-file download.
pub struct FileDownload {
    /// Original filename, for the `Content-Disposition` header.
    pub name: String,
    /// MIME content type, if the backend knows it.
    pub content_type: Option<String>,
    /// Total size in bytes, if known.
    pub content_length: Option<u64>,
    /// The file's bytes, pulled from the blob store on demand.
    pub stream: BoxStream<'static, Result<Bytes, BlobError>>,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Counters from one administrative sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Groups successfully reaped.
    pub reaped: u64,
    /// Groups whose reap failed (retried next cycle).
    pub errors: u64,
}

/// Orchestrates creation, resolution, download, and teardown of file
/// groups.
///
/// Holds its collaborators as explicitly constructed, process-scoped
/// dependencies rather than module-level singletons. Within a single
/// group operations are single-writer by construction (created once,
/// then read-only until reaped), so the manager needs no locking; the
/// only race, sweep vs. timer both reaping the same id, is absorbed by
/// idempotent deletes.
pub struct LinkLifecycleManager {
    repo: Arc<dyn FileGroupRepository>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn ExpiryNotifier>,
    limits: UploadLimits,
    metrics: Arc<LifecycleMetrics>,
}

impl std::fmt::Debug for LinkLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LinkLifecycleManager")
    }
}

impl LinkLifecycleManager {
    /// Start building a manager.
    #[must_use]
    pub fn builder() -> LinkLifecycleManagerBuilder {
        LinkLifecycleManagerBuilder::new()
    }

    /// The manager's metrics counters.
    #[must_use]
    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    /// Create a file group: upload every blob, then persist metadata,
    /// then register the expiry deadline.
    ///
    /// Validation runs before any side effect. If any upload fails, or
    /// the metadata write fails after the uploads, every blob stored by
    /// this attempt is deleted best-effort before the error surfaces:
    /// a failed create leaves nothing behind, and retrying it is safe.
    pub async fn create(
        &self,
        files: Vec<UploadedFile>,
        ttl: Option<Duration>,
    ) -> Result<CreatedGroup, LifecycleError> {
        if let Err(e) = self.limits.validate(&files) {
            self.metrics.increment_uploads_rejected();
            return Err(e.into());
        }
        let ttl = match self.limits.resolve_ttl(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                self.metrics.increment_uploads_rejected();
                return Err(e.into());
            }
        };
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| LifecycleError::Configuration("ttl out of range".to_owned()))?;
        let expires_at = Utc::now() + ttl;

        let mut original_names = Vec::with_capacity(files.len());
        let mut storage_paths = Vec::with_capacity(files.len());

        for file in &files {
            let key = storage_key(&file.name);
            match self.blobs.put(&key, file.data.clone()).await {
                Ok(path) => {
                    original_names.push(file.name.clone());
                    storage_paths.push(path);
                }
                Err(e) => {
                    warn!(
                        file = %file.name,
                        uploaded = storage_paths.len(),
                        error = %e,
                        "blob upload failed, rolling back siblings"
                    );
                    self.rollback_blobs(&storage_paths).await;
                    self.metrics.increment_uploads_rolled_back();
                    return Err(LifecycleError::Upload(e));
                }
            }
        }

        let new_group = NewFileGroup {
            original_names: original_names.clone(),
            storage_paths: storage_paths.clone(),
            expires_at,
        };
        let id = match self.repo.create(new_group).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    uploaded = storage_paths.len(),
                    error = %e,
                    "metadata persist failed, rolling back uploads"
                );
                self.rollback_blobs(&storage_paths).await;
                self.metrics.increment_uploads_rolled_back();
                return Err(LifecycleError::Persistence(e));
            }
        };

        if let Err(e) = self.notifier.register(&id, expires_at).await {
            // The record is persisted; the fallback sweep will reap it.
            warn!(id = %id, error = %e, "expiry registration failed");
        }

        self.metrics.increment_groups_created();
        info!(
            id = %id,
            files = original_names.len(),
            expires_at = %expires_at,
            "file group created"
        );
        Ok(CreatedGroup { id, expires_at })
    }

    /// Resolve a link token.
    ///
    /// Expiry is judged here, by timestamp, on every call: a record
    /// whose deadline has passed is `Expired` even though the reaper
    /// may not have deleted it yet. "Record exists" is never "record
    /// valid".
    pub async fn resolve(&self, id: &FileGroupId) -> Result<ResolveOutcome, LifecycleError> {
        let Some(group) = self.repo.find_by_id(id).await? else {
            return Ok(ResolveOutcome::NotFound);
        };
        let now = Utc::now();
        if group.is_expired_at(now) {
            return Ok(ResolveOutcome::Expired);
        }
        let remaining = group.remaining_at(now);
        Ok(ResolveOutcome::Valid { group, remaining })
    }

    /// Stream one file of a valid group.
    ///
    /// The blob is opened with a capability scoped to the group's
    /// remaining lifetime, never longer. An out-of-range index is
    /// `NotFound`, the same as an unknown id.
    pub async fn fetch_one(
        &self,
        id: &FileGroupId,
        index: usize,
    ) -> Result<FileDownload, LifecycleError> {
        let (group, remaining) = self.require_valid(id).await?;
        let Some(path) = group.storage_paths.get(index) else {
            return Err(LifecycleError::NotFound);
        };

        let reader = self
            .blobs
            .open(path, remaining)
            .await
            .map_err(LifecycleError::Retrieval)?;

        self.metrics.increment_downloads();
        Ok(FileDownload {
            name: group.original_names[index].clone(),
            content_type: reader.content_type,
            content_length: reader.content_length,
            stream: reader.stream,
        })
    }

    /// Stream every file of a valid group as one zip archive.
    ///
    /// Entries are written in `original_names` order, each streamed
    /// through the encoder as it is read, so memory stays bounded by
    /// one in-flight chunk window rather than the sum of the files.
    pub async fn fetch_all_as_archive(
        &self,
        id: &FileGroupId,
    ) -> Result<ArchiveDownload, LifecycleError> {
        let (group, remaining) = self.require_valid(id).await?;
        let download = archive::stream_archive(Arc::clone(&self.blobs), group, remaining);
        self.metrics.increment_archives();
        Ok(download)
    }

    /// Tear down a group: delete its blobs, then its metadata record.
    ///
    /// Idempotent: reaping an absent id is a successful no-op, which
    /// makes the race between the timer path and the sweep path
    /// harmless. Per-blob deletion failures are logged and skipped so a
    /// stuck blob cannot block cleanup; the metadata record is deleted
    /// regardless. Blobs go first: if the process dies mid-reap the
    /// surviving record lets a later sweep retry, whereas the reverse
    /// order could leak blobs nothing points to.
    pub async fn reap(&self, id: &FileGroupId) -> Result<(), LifecycleError> {
        let Some(group) = self.repo.find_by_id(id).await? else {
            return Ok(());
        };

        for path in &group.storage_paths {
            if let Err(e) = self.blobs.delete(path).await {
                warn!(id = %id, path = %path, error = %e, "blob deletion failed during reap");
                self.metrics.increment_reap_blob_errors();
            }
        }

        self.repo.delete_by_id(id).await?;
        self.metrics.increment_groups_reaped();
        info!(id = %id, files = group.original_names.len(), "reaped expired file group");
        Ok(())
    }

    /// Reap every group whose deadline has passed.
    ///
    /// This is the administrative sweep; the background reaper calls it
    /// on its interval. Safe to run concurrently with itself and with
    /// the timer path.
    pub async fn sweep_expired(&self) -> Result<SweepStats, LifecycleError> {
        let expired = self.repo.find_expired_before(Utc::now()).await?;
        let mut stats = SweepStats::default();

        for group in expired {
            match self.reap(&group.id).await {
                Ok(()) => stats.reaped += 1,
                Err(e) => {
                    warn!(id = %group.id, error = %e, "sweep failed to reap group");
                    stats.errors += 1;
                }
            }
        }

        if stats.reaped > 0 || stats.errors > 0 {
            info!(
                reaped = stats.reaped,
                errors = stats.errors,
                "expiry sweep complete"
            );
        }
        Ok(stats)
    }

    async fn require_valid(
        &self,
        id: &FileGroupId,
    ) -> Result<(vanish_core::FileGroup, Duration), LifecycleError> {
        match self.resolve(id).await? {
            ResolveOutcome::Valid { group, remaining } => Ok((group, remaining)),
            ResolveOutcome::NotFound => Err(LifecycleError::NotFound),
            ResolveOutcome::Expired => Err(LifecycleError::Expired),
        }
    }

    async fn rollback_blobs(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.blobs.delete(path).await {
                warn!(path = %path, error = %e, "rollback deletion failed");
            }
        }
    }
}

/// Builder for [`LinkLifecycleManager`].
pub struct LinkLifecycleManagerBuilder {
    repo: Option<Arc<dyn FileGroupRepository>>,
    blobs: Option<Arc<dyn BlobStore>>,
    notifier: Option<Arc<dyn ExpiryNotifier>>,
    limits: UploadLimits,
    metrics: Option<Arc<LifecycleMetrics>>,
}

impl LinkLifecycleManagerBuilder {
    /// Create a builder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repo: None,
            blobs: None,
            notifier: None,
            limits: UploadLimits::default(),
            metrics: None,
        }
    }

    /// Set the metadata repository (required).
    #[must_use]
    pub fn repository(mut self, repo: Arc<dyn FileGroupRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Set the blob store (required).
    #[must_use]
    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Set the expiry notifier. Defaults to [`SweepNotifier`].
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn ExpiryNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the upload limits.
    #[must_use]
    pub fn limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Share a metrics handle (e.g. with the HTTP layer).
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<LifecycleMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the manager.
    pub fn build(self) -> Result<LinkLifecycleManager, LifecycleError> {
        let repo = self
            .repo
            .ok_or_else(|| LifecycleError::Configuration("repository is required".to_owned()))?;
        let blobs = self
            .blobs
            .ok_or_else(|| LifecycleError::Configuration("blob store is required".to_owned()))?;

        Ok(LinkLifecycleManager {
            repo,
            blobs,
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(SweepNotifier::new())),
            limits: self.limits,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

impl Default for LinkLifecycleManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
