use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vanish_core::{FileGroup, FileGroupId, NewFileGroup};

use crate::error::RepositoryError;

/// Keyed store for [`FileGroup`] metadata records.
///
/// Implementations must be `Send + Sync` and safe for concurrent
/// access. The repository is a dumb keyed store: it never interprets
/// expiry. Whether a record is *valid* is decided by the lifecycle
/// layer from `expires_at`, never from mere record existence.
#[async_trait]
pub trait FileGroupRepository: Send + Sync {
    /// Persist a new group, assigning its id and `created_at`.
    ///
    /// Ids are never reused.
    async fn create(&self, group: NewFileGroup) -> Result<FileGroupId, RepositoryError>;

    /// Look up a group by id. Returns `None` if no record exists.
    async fn find_by_id(&self, id: &FileGroupId) -> Result<Option<FileGroup>, RepositoryError>;

    /// Delete a group's record.
    ///
    /// Idempotent: deleting an absent id succeeds. The reaper relies on
    /// this to tolerate races between the sweep and event-driven paths.
    async fn delete_by_id(&self, id: &FileGroupId) -> Result<(), RepositoryError>;

    /// Return all groups whose `expires_at` is strictly before `cutoff`.
    ///
    /// Used only by the sweep expiry strategy.
    async fn find_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FileGroup>, RepositoryError>;
}
