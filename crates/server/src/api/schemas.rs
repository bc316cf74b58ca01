use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response to a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Shareable link for the uploaded group.
    #[schema(example = "http://localhost:8080/open/0b8f7c1e-4a2d-4f1a-9c3e-2d6f8a1b5c4d")]
    pub link: String,
    /// The group id (the link token).
    pub id: String,
    /// When the group expires.
    pub expires_at: DateTime<Utc>,
}

/// Response to a link validity check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckResponse {
    /// Always `true`; invalid links answer 404 or 410 instead.
    #[schema(example = true)]
    pub valid: bool,
    /// Original filenames, in download-index order.
    pub names: Vec<String>,
    /// When the group expires.
    pub expires_at: DateTime<Utc>,
    /// Seconds of lifetime left at the time of the check.
    #[schema(example = 3540)]
    pub remaining_seconds: u64,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Current lifecycle metrics snapshot.
    pub metrics: MetricsResponse,
}

/// Lifecycle metrics counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    /// File groups created.
    #[schema(example = 42)]
    pub groups_created: u64,
    /// Uploads rejected by validation.
    #[schema(example = 3)]
    pub uploads_rejected: u64,
    /// Creates that failed partway and were rolled back.
    #[schema(example = 0)]
    pub uploads_rolled_back: u64,
    /// Single-file downloads served.
    #[schema(example = 120)]
    pub downloads: u64,
    /// Archive downloads served.
    #[schema(example = 17)]
    pub archives: u64,
    /// Groups reaped after expiry.
    #[schema(example = 30)]
    pub groups_reaped: u64,
    /// Individual blob deletions that failed during reap.
    #[schema(example = 0)]
    pub reap_blob_errors: u64,
}

/// Error payload returned with non-2xx statuses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}
