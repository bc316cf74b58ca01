use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{HealthResponse, MetricsResponse};

/// `GET /health` -- returns service status together with a metrics snapshot.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and a snapshot of lifecycle metrics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.lifecycle.metrics().snapshot();

    let body = HealthResponse {
        status: "ok".into(),
        metrics: MetricsResponse {
            groups_created: snap.groups_created,
            uploads_rejected: snap.uploads_rejected,
            uploads_rolled_back: snap.uploads_rolled_back,
            downloads: snap.downloads,
            archives: snap.archives,
            groups_reaped: snap.groups_reaped,
            reap_blob_errors: snap.reap_blob_errors,
        },
    };

    (StatusCode::OK, Json(body))
}
