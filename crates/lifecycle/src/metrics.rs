use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking lifecycle outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time
/// view, call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    /// File groups created.
    pub groups_created: AtomicU64,
    /// Uploads rejected by validation.
    pub uploads_rejected: AtomicU64,
    /// Creates that failed partway and were rolled back.
    pub uploads_rolled_back: AtomicU64,
    /// Single-file downloads served.
    pub downloads: AtomicU64,
    /// Archive downloads served.
    pub archives: AtomicU64,
    /// Groups reaped (metadata and blobs deleted).
    pub groups_reaped: AtomicU64,
    /// Individual blob deletions that failed during reap.
    pub reap_blob_errors: AtomicU64,
}

impl LifecycleMetrics {
    /// Increment the groups-created counter.
    pub fn increment_groups_created(&self) {
        self.groups_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the uploads-rejected counter.
    pub fn increment_uploads_rejected(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the uploads-rolled-back counter.
    pub fn increment_uploads_rolled_back(&self) {
        self.uploads_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the downloads counter.
    pub fn increment_downloads(&self) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the archives counter.
    pub fn increment_archives(&self) {
        self.archives.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the groups-reaped counter.
    pub fn increment_groups_reaped(&self) {
        self.groups_reaped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the reap-blob-errors counter.
    pub fn increment_reap_blob_errors(&self) {
        self.reap_blob_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            groups_created: self.groups_created.load(Ordering::Relaxed),
            uploads_rejected: self.uploads_rejected.load(Ordering::Relaxed),
            uploads_rolled_back: self.uploads_rolled_back.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            archives: self.archives.load(Ordering::Relaxed),
            groups_reaped: self.groups_reaped.load(Ordering::Relaxed),
            reap_blob_errors: self.reap_blob_errors.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`LifecycleMetrics`] at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// File groups created.
    pub groups_created: u64,
    /// Uploads rejected by validation.
    pub uploads_rejected: u64,
    /// Creates that failed partway and were rolled back.
    pub uploads_rolled_back: u64,
    /// Single-file downloads served.
    pub downloads: u64,
    /// Archive downloads served.
    pub archives: u64,
    /// Groups reaped.
    pub groups_reaped: u64,
    /// Individual blob deletions that failed during reap.
    pub reap_blob_errors: u64,
}
