//! HTTP error mapping for the webhook boundary.

use crate::push_sync::services::{PushSyncError, PushSyncErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or parameters are unusable.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A collaborator failed while handling the request.
    #[error("{0}")]
    Internal(String),
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body returned for every error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl From<PushSyncError> for ApiError {
    fn from(err: PushSyncError) -> Self {
        match err.kind() {
            PushSyncErrorKind::Validation => Self::BadRequest(err.to_string()),
            PushSyncErrorKind::NotFound => Self::NotFound("Project not found".to_owned()),
            PushSyncErrorKind::Dependency => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            status: "error",
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
