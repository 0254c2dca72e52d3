use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request};
use chrono::{DateTime, Utc};

use crate::entity::blog::Visibility;
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::models::blog::BlogJsonBody;

/// Per-file upload cap.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted raster image types.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Maximum number of files on the multi-upload endpoint.
pub const MAX_BATCH_FILES: usize = 10;

/// Body limit for blog create/update: banner plus a gallery of files.
pub fn blog_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max((MAX_BATCH_FILES + 1) * MAX_IMAGE_BYTES + 1024 * 1024)
}

/// An image file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// One banner/gallery input, before resolution against the media store.
#[derive(Debug, Clone)]
pub enum ImageInput {
    File(UploadFile),
    Url(String),
}

/// The create/update input after the JSON-or-multipart boundary. Image
/// inputs are resolved exactly once, downstream of this type.
#[derive(Debug, Default)]
pub struct BlogPayload {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub date: Option<DateTime<Utc>>,
    pub banner: Option<ImageInput>,
    pub images: Option<Vec<ImageInput>>,
}

/// Parse a create/update request body, accepting either JSON or
/// `multipart/form-data` with `banner`/`images` file fields.
pub async fn parse_blog_payload(req: Request) -> Result<BlogPayload, AppError> {
    let is_multipart = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?;
        parse_multipart(multipart).await
    } else {
        let AppJson(body) = AppJson::<BlogJsonBody>::from_request(req, &()).await?;
        Ok(from_json_body(body))
    }
}

fn from_json_body(body: BlogJsonBody) -> BlogPayload {
    BlogPayload {
        title: body.title,
        subtitle: body.subtitle,
        body: body.body,
        tags: body.tags,
        visibility: body.visibility,
        date: body.date,
        banner: body.banner.map(ImageInput::Url),
        images: body
            .images
            .map(|urls| urls.into_iter().map(ImageInput::Url).collect()),
    }
}

async fn parse_multipart(mut multipart: Multipart) -> Result<BlogPayload, AppError> {
    let mut payload = BlogPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("title") => payload.title = Some(text(field).await?),
            Some("subtitle") => payload.subtitle = Some(text(field).await?),
            Some("body") => payload.body = Some(text(field).await?),
            Some("tags") => payload.tags = Some(split_tags(&text(field).await?)),
            Some("visibility") => {
                payload.visibility =
                    Some(text(field).await?.parse().map_err(AppError::Validation)?);
            }
            Some("date") => {
                let raw = text(field).await?;
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| AppError::Validation(format!("Invalid date '{raw}': {e}")))?;
                payload.date = Some(parsed.with_timezone(&Utc));
            }
            Some("banner") => payload.banner = Some(image_input(field).await?),
            Some("images") => {
                payload
                    .images
                    .get_or_insert_with(Vec::new)
                    .push(image_input(field).await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(payload)
}

/// Comma-separated tag list, as sent by form clients.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))
}

/// A banner/images field is a file when the client sent a filename, and a
/// plain URL string otherwise.
async fn image_input(field: Field<'_>) -> Result<ImageInput, AppError> {
    if field.file_name().is_some() {
        Ok(ImageInput::File(read_image_file(field).await?))
    } else {
        Ok(ImageInput::Url(text(field).await?))
    }
}

/// Read and validate one uploaded image file (type and size limits).
pub async fn read_image_file(field: Field<'_>) -> Result<UploadFile, AppError> {
    let filename = field.file_name().unwrap_or("image").to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();

    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid file type '{content_type}'. Only JPEG, PNG, GIF, and WebP are allowed"
        )));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "File '{filename}' exceeds the {} MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(UploadFile {
        bytes: bytes.to_vec(),
        filename,
        content_type,
    })
}
