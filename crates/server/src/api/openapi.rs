use super::schemas::{
    CheckResponse, ErrorResponse, HealthResponse, MetricsResponse, UploadResponse,
};

/// OpenAPI document for the Vanish HTTP API.
#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Vanish API",
        version = "0.1.0",
        description = "HTTP API for the Vanish ephemeral file-sharing service. Upload files, share the link, and let the reaper delete everything when the TTL runs out.",
        license(name = "Apache-2.0")
    ),
    paths(
        super::health::health,
        super::files::upload,
        super::files::check,
        super::files::download,
        super::files::download_zip,
    ),
    components(schemas(
        UploadResponse,
        CheckResponse,
        HealthResponse,
        MetricsResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Files", description = "Upload, check, and download expiring file groups")
    )
)]
pub struct ApiDoc;
