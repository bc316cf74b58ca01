//! Metadata repository backend selection.

use std::sync::Arc;

use vanish_repo::FileGroupRepository;
use vanish_repo_memory::MemoryFileGroupRepository;

use crate::config::RepositoryConfig;
use crate::error::ServerError;

/// Create the repository named by the configuration.
///
/// Only the in-memory backend ships today; a database backend plugs in
/// here without touching the lifecycle layer.
pub fn create_repository(
    config: &RepositoryConfig,
) -> Result<Arc<dyn FileGroupRepository>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryFileGroupRepository::new())),
        other => Err(ServerError::Config(format!(
            "unknown repository backend: {other}"
        ))),
    }
}
