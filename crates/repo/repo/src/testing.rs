//! Conformance test suite for [`FileGroupRepository`] backends.

use chrono::{Duration, Utc};

use vanish_core::NewFileGroup;

use crate::error::RepositoryError;
use crate::repository::FileGroupRepository;

fn new_group(names: &[&str], ttl_seconds: i64) -> NewFileGroup {
    NewFileGroup {
        original_names: names.iter().map(|&n| n.to_owned()).collect(),
        storage_paths: names.iter().map(|&n| format!("path-{n}")).collect(),
        expires_at: Utc::now() + Duration::seconds(ttl_seconds),
    }
}

/// Run the full repository conformance test suite.
///
/// Call this from your backend's test module with a fresh repository
/// instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_repository_conformance_tests(
    repo: &dyn FileGroupRepository,
) -> Result<(), RepositoryError> {
    test_create_and_find(repo).await?;
    test_ids_are_unique(repo).await?;
    test_find_missing(repo).await?;
    test_delete_is_idempotent(repo).await?;
    test_find_expired_before(repo).await?;
    Ok(())
}

async fn test_create_and_find(repo: &dyn FileGroupRepository) -> Result<(), RepositoryError> {
    let id = repo.create(new_group(&["a.txt", "b.txt"], 60)).await?;
    let found = repo.find_by_id(&id).await?;
    let group = found.expect("created group should be findable");
    assert_eq!(group.id, id);
    assert_eq!(group.original_names, vec!["a.txt", "b.txt"]);
    assert_eq!(group.storage_paths, vec!["path-a.txt", "path-b.txt"]);
    assert_eq!(group.original_names.len(), group.storage_paths.len());
    Ok(())
}

async fn test_ids_are_unique(repo: &dyn FileGroupRepository) -> Result<(), RepositoryError> {
    let first = repo.create(new_group(&["x"], 60)).await?;
    let second = repo.create(new_group(&["x"], 60)).await?;
    assert_ne!(first, second, "repository must never reuse ids");
    Ok(())
}

async fn test_find_missing(repo: &dyn FileGroupRepository) -> Result<(), RepositoryError> {
    let found = repo.find_by_id(&"never-created".into()).await?;
    assert!(found.is_none(), "find on missing id should return None");
    Ok(())
}

async fn test_delete_is_idempotent(repo: &dyn FileGroupRepository) -> Result<(), RepositoryError> {
    let id = repo.create(new_group(&["doomed"], 60)).await?;
    repo.delete_by_id(&id).await?;
    assert!(
        repo.find_by_id(&id).await?.is_none(),
        "deleted group should not be findable"
    );

    // Deleting again, and deleting a never-existing id, must both succeed.
    repo.delete_by_id(&id).await?;
    repo.delete_by_id(&"never-created".into()).await?;
    Ok(())
}

async fn test_find_expired_before(repo: &dyn FileGroupRepository) -> Result<(), RepositoryError> {
    let expired = repo.create(new_group(&["old"], -10)).await?;
    let live = repo.create(new_group(&["new"], 600)).await?;

    let hits = repo.find_expired_before(Utc::now()).await?;
    assert!(
        hits.iter().any(|g| g.id == expired),
        "expired group should be returned"
    );
    assert!(
        !hits.iter().any(|g| g.id == live),
        "live group should not be returned"
    );
    Ok(())
}
