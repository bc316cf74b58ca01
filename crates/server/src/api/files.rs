use std::time::Duration;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use vanish_core::{ResolveOutcome, UploadedFile, sanitize_filename};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{CheckResponse, ErrorResponse, UploadResponse};

/// Multipart field name carrying file parts.
const FILES_FIELD: &str = "files";
/// Multipart field name carrying the requested TTL in seconds.
const TTL_FIELD: &str = "ttl";

/// Query parameters for single-file downloads.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// Zero-based index into the group's file list.
    pub index: Option<usize>,
}

/// `POST /v1/files` -- upload one or more files, receive a shareable link.
///
/// Expects a multipart body with one or more `files` parts and an
/// optional `ttl` field (seconds). The link is live until the TTL
/// elapses, after which every read path answers 410 and the reaper
/// deletes the data.
#[utoipa::path(
    post,
    path = "/v1/files",
    tag = "Files",
    summary = "Upload files",
    description = "Uploads a multipart batch of files and returns a shareable expiring link. Fields: `files` (one part per file), `ttl` (optional, seconds).",
    request_body(content_type = "multipart/form-data", description = "Files to upload plus an optional ttl field"),
    responses(
        (status = 201, description = "Group created", body = UploadResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Upload or persistence failed", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut files = Vec::new();
    let mut ttl: Option<Duration> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(ToOwned::to_owned);
        match field_name.as_deref() {
            Some(TTL_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("unreadable ttl field: {e}")))?;
                let seconds: u64 = text
                    .trim()
                    .parse()
                    .map_err(|_| ServerError::BadRequest(format!("invalid ttl: {text:?}")))?;
                ttl = Some(Duration::from_secs(seconds));
            }
            Some(FILES_FIELD) => {
                let name = field.file_name().unwrap_or("file").to_owned();
                let content_type = field.content_type().map(ToOwned::to_owned);
                let data = field.bytes().await.map_err(|e| {
                    ServerError::BadRequest(format!("unreadable file part: {e}"))
                })?;
                files.push(UploadedFile {
                    name,
                    content_type,
                    data,
                });
            }
            // Unknown fields are ignored, matching the original form handler.
            _ => {}
        }
    }

    let created = state.lifecycle.create(files, ttl).await?;
    let link = format!("{}/{}", state.link_base, created.id);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            link,
            id: created.id.to_string(),
            expires_at: created.expires_at,
        }),
    ))
}

/// `GET /v1/files/{id}/check` -- report whether a link is still valid.
#[utoipa::path(
    get,
    path = "/v1/files/{id}/check",
    tag = "Files",
    summary = "Check link validity",
    description = "Returns the file list and remaining lifetime for a live link. Expired links answer 410, unknown links 404.",
    params(
        ("id" = String, Path, description = "The link token")
    ),
    responses(
        (status = 200, description = "Link is valid", body = CheckResponse),
        (status = 404, description = "No such group", body = ErrorResponse),
        (status = 410, description = "Link expired", body = ErrorResponse)
    )
)]
pub async fn check(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CheckResponse>, ServerError> {
    match state.lifecycle.resolve(&id.into()).await? {
        ResolveOutcome::Valid { group, remaining } => Ok(Json(CheckResponse {
            valid: true,
            names: group.original_names,
            expires_at: group.expires_at,
            remaining_seconds: remaining.as_secs(),
        })),
        ResolveOutcome::NotFound => Err(ServerError::NotFound),
        ResolveOutcome::Expired => Err(ServerError::Gone),
    }
}

/// `GET /v1/files/{id}?index=N` -- stream one file of a group.
///
/// The blob is proxied through the service, so the storage provider is
/// never exposed and the response carries the original filename. A
/// missing or out-of-range index answers 404.
#[utoipa::path(
    get,
    path = "/v1/files/{id}",
    tag = "Files",
    summary = "Download one file",
    description = "Streams the file at the given index with an attachment disposition. The index query parameter is required.",
    params(
        ("id" = String, Path, description = "The link token"),
        ("index" = Option<usize>, Query, description = "Zero-based file index")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such group or index", body = ErrorResponse),
        (status = 410, description = "Link expired", body = ErrorResponse)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ServerError> {
    let Some(index) = query.index else {
        return Err(ServerError::NotFound);
    };

    let download = state.lifecycle.fetch_one(&id.into(), index).await?;

    let content_type = download
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    let disposition = attachment_disposition(&download.name);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition);
    if let Some(length) = download.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(download.stream))
        .map_err(|e| ServerError::Config(format!("failed to build response: {e}")))
}

/// `GET /v1/files/{id}/zip` -- stream every file of a group as a zip.
#[utoipa::path(
    get,
    path = "/v1/files/{id}/zip",
    tag = "Files",
    summary = "Download all files as a zip",
    description = "Streams a zip archive containing every file of the group, encoded on the fly.",
    params(
        ("id" = String, Path, description = "The link token")
    ),
    responses(
        (status = 200, description = "Zip archive bytes", content_type = "application/zip"),
        (status = 404, description = "No such group", body = ErrorResponse),
        (status = 410, description = "Link expired", body = ErrorResponse)
    )
)]
pub async fn download_zip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let archive = state.lifecycle.fetch_all_as_archive(&id.into()).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&archive.filename),
        )
        .body(Body::from_stream(ReaderStream::new(archive.reader)))
        .map_err(|e| ServerError::Config(format!("failed to build response: {e}")))
}

/// Build a `Content-Disposition` value that is always a valid ASCII
/// header, whatever the original filename contained.
fn attachment_disposition(name: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_filename(name))
}
