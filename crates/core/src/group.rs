use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::FileGroupId;

/// A persisted group of uploaded files sharing one link and one expiry.
///
/// `original_names` and `storage_paths` are index-aligned: entry `i` of
/// each describes the same file. Both are non-empty for any group that
/// exists. A group is read-only for its entire live window; the only
/// writes are its creation and its eventual deletion by the reaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileGroup {
    /// Unique identifier, also the public link token.
    pub id: FileGroupId,
    /// Original filenames as uploaded, one per file.
    pub original_names: Vec<String>,
    /// Opaque blob-store keys, same length and order as `original_names`.
    pub storage_paths: Vec<String>,
    /// When the group was persisted.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry instant. The group is live while `now < expires_at`.
    pub expires_at: DateTime<Utc>,
}

impl FileGroup {
    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage_paths.len()
    }

    /// Whether the group holds no files. Never true for a persisted group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage_paths.is_empty()
    }

    /// Whether the group has expired as of `now`.
    ///
    /// Expiry is judged purely by timestamp comparison: a group whose
    /// record still physically exists but whose deadline has passed is
    /// expired, full stop.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Remaining lifetime as of `now`, or zero if already expired.
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

/// The data needed to persist a new [`FileGroup`].
///
/// The repository assigns the id and the `created_at` timestamp.
#[derive(Debug, Clone)]
pub struct NewFileGroup {
    /// Original filenames as uploaded.
    pub original_names: Vec<String>,
    /// Blob-store keys returned by the uploads, index-aligned.
    pub storage_paths: Vec<String>,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}
