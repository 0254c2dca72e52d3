use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::UploadedImage;

/// Body for the URL-based upload endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFromUrlRequest {
    pub url: String,
    /// Optional explicit public id; the store derives one otherwise.
    pub public_id: Option<String>,
}

/// A single stored image as returned by the upload endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImageResponse {
    pub public_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub bytes: u64,
    /// Convenience 800x600 delivery URL.
    pub thumbnail: String,
}

impl UploadedImageResponse {
    pub fn new(image: UploadedImage, thumbnail: String) -> Self {
        Self {
            public_id: image.public_id,
            url: image.url,
            width: image.width,
            height: image.height,
            format: image.format,
            bytes: image.bytes,
            thumbnail,
        }
    }
}

/// One failed item in a multi-file upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailedUpload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub error: String,
}

/// Aggregate result of a multi-file upload. Partial failure does not fail
/// the request; callers inspect the counts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadResponse {
    pub uploaded: Vec<UploadedImageResponse>,
    pub failed: Vec<FailedUpload>,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Result of the standalone delete endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteImageResponse {
    /// Raw result string from the media store.
    pub result: String,
}
