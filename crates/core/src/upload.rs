use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// One file received from a client, held in memory until it is uploaded
/// to the blob store.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as supplied by the client.
    pub name: String,
    /// MIME content type as supplied by the client, if any.
    pub content_type: Option<String>,
    /// Raw file content.
    pub data: Bytes,
}

/// Input validation errors, rejected before any side effect occurs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The upload contained no files.
    #[error("no files uploaded")]
    NoFiles,

    /// The upload contained more files than the configured maximum.
    #[error("too many files: {count} exceeds limit of {limit}")]
    TooManyFiles {
        /// Number of files in the request.
        count: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A single file exceeded the configured size limit.
    #[error("file too large: \"{name}\" is {size} bytes, limit is {limit}")]
    FileTooLarge {
        /// Name of the offending file.
        name: String,
        /// Actual size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        limit: u64,
    },

    /// The requested TTL was zero.
    #[error("ttl must be greater than zero")]
    ZeroTtl,

    /// The requested TTL exceeded the configured maximum.
    #[error("ttl too long: {requested_seconds}s exceeds limit of {max_seconds}s")]
    TtlTooLong {
        /// Requested TTL in seconds.
        requested_seconds: u64,
        /// Configured maximum in seconds.
        max_seconds: u64,
    },
}

/// Upload validation limits and TTL policy.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Maximum number of files per upload.
    pub max_files: usize,
    /// Maximum size of a single file, in bytes.
    pub max_file_bytes: u64,
    /// TTL applied when the client does not request one.
    pub default_ttl: Duration,
    /// Upper bound on the client-requested TTL. An expiring store with
    /// an unbounded TTL is not an expiring store.
    pub max_ttl: Duration,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 50 * 1024 * 1024,
            default_ttl: Duration::from_secs(3600),
            max_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl UploadLimits {
    /// Validate an upload batch against the configured limits.
    ///
    /// Runs before any blob is written, so a rejected upload leaves no
    /// side effects to clean up.
    pub fn validate(&self, files: &[UploadedFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                limit: self.max_files,
            });
        }
        for file in files {
            let size = file.data.len() as u64;
            if size > self.max_file_bytes {
                return Err(ValidationError::FileTooLarge {
                    name: file.name.clone(),
                    size,
                    limit: self.max_file_bytes,
                });
            }
        }
        Ok(())
    }

    /// Resolve the effective TTL for a request.
    ///
    /// `None` falls back to the default; an explicit value must be
    /// positive and no longer than `max_ttl`.
    pub fn resolve_ttl(&self, requested: Option<Duration>) -> Result<Duration, ValidationError> {
        let Some(ttl) = requested else {
            return Ok(self.default_ttl);
        };
        if ttl.is_zero() {
            return Err(ValidationError::ZeroTtl);
        }
        if ttl > self.max_ttl {
            return Err(ValidationError::TtlTooLong {
                requested_seconds: ttl.as_secs(),
                max_seconds: self.max_ttl.as_secs(),
            });
        }
        Ok(ttl)
    }
}
