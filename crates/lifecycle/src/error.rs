use thiserror::Error;

use vanish_blob::BlobError;
use vanish_core::ValidationError;
use vanish_repo::RepositoryError;

/// Errors that can occur during link lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Bad input shape, rejected before any side effect.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A blob upload failed during create. Already-uploaded siblings
    /// have been rolled back best-effort; retrying the create is safe.
    #[error("upload failed: {0}")]
    Upload(#[source] BlobError),

    /// The metadata store failed after all blobs were uploaded. The
    /// blobs have been rolled back best-effort; retrying is safe.
    #[error("metadata persistence failed: {0}")]
    Persistence(#[source] RepositoryError),

    /// No group exists for the id (or the index was out of range).
    #[error("file group not found")]
    NotFound,

    /// The group's expiry deadline has passed.
    #[error("link expired")]
    Expired,

    /// A repository read or delete failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Opening a blob for download failed.
    #[error("blob retrieval failed: {0}")]
    Retrieval(#[source] BlobError),

    /// Encoding or writing the zip archive failed. Includes the client
    /// hanging up mid-download, which closes the archive pipe.
    #[error("archive streaming failed: {0}")]
    Archive(String),

    /// Registering a group with the expiry notifier failed. The
    /// fallback sweep still covers the group.
    #[error("expiry registration failed: {0}")]
    Notify(String),

    /// The manager was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}
