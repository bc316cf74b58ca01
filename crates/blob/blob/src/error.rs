use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// The backend cannot issue signed URLs.
    ///
    /// Local backends (memory, filesystem) serve bytes only through
    /// [`BlobStore::open`](crate::BlobStore::open); a redirect-style
    /// presentation layer needs a backend with real signing support.
    #[error("signed urls not supported by this backend")]
    SignedUrlUnsupported,

    /// An I/O error from a local backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
