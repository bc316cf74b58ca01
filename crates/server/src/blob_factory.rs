//! Blob store backend selection.

use std::sync::Arc;

use vanish_blob::BlobStore;
use vanish_blob_fs::FsBlobStore;
use vanish_blob_memory::MemoryBlobStore;
use vanish_blob_supabase::{SupabaseBlobStore, SupabaseConfig};

use crate::config::BlobConfig;
use crate::error::ServerError;

/// Create the blob store named by the configuration.
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryBlobStore::new())),
        "fs" => {
            let root = config.root.clone().unwrap_or_else(|| "data/blobs".to_owned());
            let store = FsBlobStore::create(root)
                .await
                .map_err(|e| ServerError::Config(format!("fs blob store: {e}")))?;
            Ok(Arc::new(store))
        }
        "supabase" => {
            let url = config
                .url
                .clone()
                .ok_or_else(|| ServerError::Config("supabase backend requires blob.url".into()))?;
            let service_key = config.service_key.clone().ok_or_else(|| {
                ServerError::Config("supabase backend requires blob.service_key".into())
            })?;
            let supabase_config = SupabaseConfig {
                url,
                service_key,
                bucket: config.bucket.clone().unwrap_or_else(|| "files".to_owned()),
                ..SupabaseConfig::default()
            };
            let store = SupabaseBlobStore::new(supabase_config)
                .map_err(|e| ServerError::Config(format!("supabase blob store: {e}")))?;
            Ok(Arc::new(store))
        }
        other => Err(ServerError::Config(format!(
            "unknown blob backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_is_created() {
        let config = BlobConfig {
            backend: "memory".to_owned(),
            ..BlobConfig::default()
        };
        assert!(create_blob_store(&config).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = BlobConfig {
            backend: "s3".to_owned(),
            ..BlobConfig::default()
        };
        let err = create_blob_store(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn supabase_backend_requires_credentials() {
        let config = BlobConfig {
            backend: "supabase".to_owned(),
            ..BlobConfig::default()
        };
        let err = create_blob_store(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn fs_backend_uses_configured_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = BlobConfig {
            backend: "fs".to_owned(),
            root: Some(dir.path().join("blobs").to_string_lossy().into_owned()),
            ..BlobConfig::default()
        };
        assert!(create_blob_store(&config).await.is_ok());
        assert!(dir.path().join("blobs").is_dir());
    }
}
