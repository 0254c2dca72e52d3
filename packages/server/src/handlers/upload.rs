use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::json::AppJson;
use crate::models::shared::Envelope;
use crate::models::upload::{
    BatchUploadResponse, DeleteImageResponse, FailedUpload, UploadFromUrlRequest,
    UploadedImageResponse,
};
use crate::state::AppState;

use super::payload::{MAX_BATCH_FILES, MAX_IMAGE_BYTES, read_image_file};

const THUMBNAIL_WIDTH: u32 = 800;
const THUMBNAIL_HEIGHT: u32 = 600;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_BATCH_FILES * MAX_IMAGE_BYTES + 1024 * 1024)
}

fn enrich(state: &AppState, image: common::UploadedImage) -> UploadedImageResponse {
    let thumbnail = state
        .media
        .transform_url(&image.public_id, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT);
    UploadedImageResponse::new(image, thumbnail)
}

#[utoipa::path(
    post,
    path = "/api/blogs/upload-image",
    tag = "Uploads",
    operation_id = "uploadImage",
    summary = "Upload a single image",
    request_body(content_type = "multipart/form-data", description = "`image` file field"),
    responses(
        (status = 201, description = "Image stored", body = Envelope<UploadedImageResponse>),
        (status = 400, description = "Missing/invalid file or upload failure", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            file = Some(read_image_file(field).await?);
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;

    let uploaded = state
        .media
        .upload_bytes(file.bytes, &file.content_type, &file.filename)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Image uploaded successfully",
            enrich(&state, uploaded),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/blogs/upload/multiple",
    tag = "Uploads",
    operation_id = "uploadMultipleImages",
    summary = "Upload up to 10 images in one request",
    description = "Partial failure does not fail the request: the response aggregates \
        uploaded and failed items with their counts.",
    request_body(content_type = "multipart/form-data", description = "Repeated `images` file fields"),
    responses(
        (status = 200, description = "Aggregate upload result", body = Envelope<BatchUploadResponse>),
        (status = 400, description = "No files or too many files", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_multiple_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<BatchUploadResponse>>, AppError> {
    // Read the whole batch before uploading anything, so an oversized batch
    // is rejected without side effects.
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("images") {
            continue;
        }
        if files.len() == MAX_BATCH_FILES {
            return Err(AppError::Validation(format!(
                "At most {MAX_BATCH_FILES} images per request"
            )));
        }

        let filename = field.file_name().map(str::to_string);
        match read_image_file(field).await {
            Ok(file) => files.push((filename, Ok(file))),
            Err(AppError::Validation(msg)) => files.push((filename, Err(msg))),
            Err(other) => return Err(other),
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation("Missing 'images' fields".into()));
    }

    let total = files.len();
    let mut uploaded = Vec::new();
    let mut failed = Vec::new();

    // A bad file and a failed store call both land in `failed`; the rest of
    // the batch still goes through.
    for (filename, read_outcome) in files {
        let outcome = match read_outcome {
            Ok(file) => state
                .media
                .upload_bytes(file.bytes, &file.content_type, &file.filename)
                .await
                .map_err(|e| e.to_string()),
            Err(msg) => Err(msg),
        };

        match outcome {
            Ok(image) => uploaded.push(enrich(&state, image)),
            Err(error) => failed.push(FailedUpload { filename, error }),
        }
    }

    let response = BatchUploadResponse {
        success_count: uploaded.len(),
        failure_count: failed.len(),
        total,
        uploaded,
        failed,
    };

    Ok(Json(Envelope::ok(response)))
}

#[utoipa::path(
    post,
    path = "/api/blogs/upload/url",
    tag = "Uploads",
    operation_id = "uploadImageFromUrl",
    summary = "Re-host an externally referenced image",
    request_body = UploadFromUrlRequest,
    responses(
        (status = 201, description = "Image stored", body = Envelope<UploadedImageResponse>),
        (status = 400, description = "Invalid body or upload failure", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn upload_image_from_url(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UploadFromUrlRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.url.trim().is_empty() {
        return Err(AppError::Validation("'url' is required".into()));
    }

    let uploaded = state
        .media
        .upload_from_url(&payload.url, payload.public_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Image uploaded successfully",
            enrich(&state, uploaded),
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/image/{public_id}",
    tag = "Uploads",
    operation_id = "deleteImage",
    summary = "Delete a stored image by public id",
    params(("public_id" = String, Path)),
    responses(
        (status = 200, description = "Image deleted (or already absent)", body = Envelope<DeleteImageResponse>),
        (status = 400, description = "Store rejected the delete", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<Envelope<DeleteImageResponse>>, AppError> {
    let outcome = state.media.delete_one(&public_id).await?;

    if !outcome.success {
        return Err(AppError::Upload(format!(
            "delete of '{public_id}' returned '{}'",
            outcome.result
        )));
    }

    Ok(Json(Envelope::with_message(
        "Image deleted successfully",
        DeleteImageResponse {
            result: outcome.result,
        },
    )))
}
