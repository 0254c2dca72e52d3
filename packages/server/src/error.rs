use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use common::MediaError;

use crate::store::StoreError;

/// Envelope returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Human-readable description of what failed.
    #[schema(example = "Blog not found")]
    pub message: String,
    /// Raw underlying error, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application-level error type.
///
/// Handlers never let a dependency error escape untranslated: everything is
/// converted into one of these and then into the JSON envelope.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid input, surfaced as 400.
    Validation(String),
    /// Unknown id/slug/resource, surfaced as 404.
    NotFound(String),
    /// A media store call failed on a direct upload path, surfaced as 400.
    Upload(String),
    /// Anything else, surfaced as 500 with the underlying message.
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorEnvelope) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope {
                    success: false,
                    message: msg,
                    error: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorEnvelope {
                    success: false,
                    message: msg,
                    error: None,
                },
            ),
            AppError::Upload(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope {
                    success: false,
                    message: "Image upload failed".into(),
                    error: Some(detail),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope {
                        success: false,
                        message: "Internal server error".into(),
                        error: Some(detail),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSlug(slug) => {
                AppError::Validation(format!("A blog with slug '{slug}' already exists"))
            }
            StoreError::Database(detail) => AppError::Internal(detail),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::Upload(err.to_string())
    }
}
