//! In-memory [`FileGroupRepository`] backend.
//!
//! A `DashMap` keyed by group id. The expiry query is a full scan,
//! which is fine at the scale a single-process deployment sees; a
//! database backend would index `expires_at` instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use vanish_core::{FileGroup, FileGroupId, NewFileGroup};
use vanish_repo::{FileGroupRepository, RepositoryError};

/// `DashMap`-backed repository.
#[derive(Debug, Default)]
pub struct MemoryFileGroupRepository {
    groups: DashMap<FileGroupId, FileGroup>,
}

impl MemoryFileGroupRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the repository holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[async_trait]
impl FileGroupRepository for MemoryFileGroupRepository {
    async fn create(&self, group: NewFileGroup) -> Result<FileGroupId, RepositoryError> {
        let id = FileGroupId::generate();
        let record = FileGroup {
            id: id.clone(),
            original_names: group.original_names,
            storage_paths: group.storage_paths,
            created_at: Utc::now(),
            expires_at: group.expires_at,
        };
        self.groups.insert(id.clone(), record);
        Ok(id)
    }

    async fn find_by_id(&self, id: &FileGroupId) -> Result<Option<FileGroup>, RepositoryError> {
        Ok(self.groups.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete_by_id(&self, id: &FileGroupId) -> Result<(), RepositoryError> {
        self.groups.remove(id);
        Ok(())
    }

    async fn find_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FileGroup>, RepositoryError> {
        Ok(self
            .groups
            .iter()
            .filter(|entry| entry.value().expires_at < cutoff)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vanish_repo::testing::run_repository_conformance_tests;

    #[tokio::test]
    async fn passes_repository_conformance_suite() {
        let repo = MemoryFileGroupRepository::new();
        run_repository_conformance_tests(&repo).await.unwrap();
    }

    #[tokio::test]
    async fn created_at_is_assigned_by_repository() {
        let repo = MemoryFileGroupRepository::new();
        let before = Utc::now();
        let id = repo
            .create(NewFileGroup {
                original_names: vec!["a".into()],
                storage_paths: vec!["p".into()],
                expires_at: Utc::now() + Duration::seconds(60),
            })
            .await
            .unwrap();
        let group = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(group.created_at >= before);
        assert!(group.created_at <= Utc::now());
    }
}
