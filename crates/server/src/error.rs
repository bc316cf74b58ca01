use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vanish_lifecycle::LifecycleError;

/// Errors that can occur when running the Vanish server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A lifecycle-level error surfaced through the API.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The request body could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No file group exists for the requested id or index.
    #[error("file group not found")]
    NotFound,

    /// The link has expired.
    #[error("link expired")]
    Gone,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Gone => (StatusCode::GONE, self.to_string()),
            Self::Lifecycle(e) => match e {
                LifecycleError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
                LifecycleError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                LifecycleError::Expired => (StatusCode::GONE, e.to_string()),
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanish_core::ValidationError;

    #[test]
    fn status_mapping_follows_the_error_taxonomy() {
        let cases = [
            (
                ServerError::Lifecycle(LifecycleError::Validation(ValidationError::NoFiles)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::Lifecycle(LifecycleError::NotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                ServerError::Lifecycle(LifecycleError::Expired),
                StatusCode::GONE,
            ),
            (ServerError::NotFound, StatusCode::NOT_FOUND),
            (ServerError::Gone, StatusCode::GONE),
            (
                ServerError::BadRequest("nope".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::Config("broken".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
