use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::instrument;

use crate::entity::blog::Visibility;
use crate::error::{AppError, ErrorEnvelope};
use crate::models::blog::{BlogListQuery, BlogResponse, TagListQuery};
use crate::models::shared::{Envelope, Pagination};
use crate::reconcile::{collect_public_ids, delete_superseded, resolve_image, resolve_images};
use crate::state::AppState;
use crate::store::{BlogFilter, BlogPatch, NewBlog};

use super::payload::{parse_blog_payload, split_tags};

const PAGE_DEFAULT: u64 = 1;
const LIMIT_DEFAULT: u64 = 10;
const LIMIT_MAX: u64 = 100;

const TITLE_MAX_CHARS: usize = 200;
const SUBTITLE_MAX_CHARS: usize = 300;

/// Length caps on the free-text fields, enforced on create and update alike.
fn validate_lengths(title: Option<&str>, subtitle: Option<&str>) -> Result<(), AppError> {
    if title.is_some_and(|t| t.chars().count() > TITLE_MAX_CHARS) {
        return Err(AppError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    if subtitle.is_some_and(|s| s.chars().count() > SUBTITLE_MAX_CHARS) {
        return Err(AppError::Validation(format!(
            "Subtitle must be at most {SUBTITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    tag = "Blogs",
    operation_id = "listBlogs",
    summary = "List blogs with filtering and pagination",
    params(BlogListQuery),
    responses(
        (status = 200, description = "Page of blogs", body = Envelope<Vec<BlogResponse>>),
        (status = 500, description = "Database failure", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<Envelope<Vec<BlogResponse>>>, AppError> {
    let page = query.page.unwrap_or(PAGE_DEFAULT).max(1);
    let limit = query.limit.unwrap_or(LIMIT_DEFAULT).clamp(1, LIMIT_MAX);

    let filter = BlogFilter {
        visibility: query.visibility,
        tags: query
            .tags
            .as_deref()
            .map(split_tags)
            .filter(|tags| !tags.is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let (items, total) = state.store.find(filter, page, limit).await?;
    let data = items.into_iter().map(BlogResponse::from).collect();

    Ok(Json(Envelope::page(data, Pagination::new(page, limit, total))))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Fetch a blog by id, falling back to slug",
    params(("id" = String, Path, description = "Object id or slug")),
    responses(
        (status = 200, description = "The blog", body = Envelope<BlogResponse>),
        (status = 404, description = "Unknown id/slug", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<BlogResponse>>, AppError> {
    let blog = state
        .store
        .find_one(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;

    Ok(Json(Envelope::ok(BlogResponse::from(blog))))
}

#[utoipa::path(
    get,
    path = "/api/blogs/slug/{slug}",
    tag = "Blogs",
    operation_id = "getBlogBySlug",
    summary = "Fetch a blog by its slug",
    params(("slug" = String, Path)),
    responses(
        (status = 200, description = "The blog", body = Envelope<BlogResponse>),
        (status = 404, description = "Unknown slug", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blog_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<BlogResponse>>, AppError> {
    let blog = state
        .store
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;

    Ok(Json(Envelope::ok(BlogResponse::from(blog))))
}

#[utoipa::path(
    get,
    path = "/api/blogs/tag/{tag}",
    tag = "Blogs",
    operation_id = "getBlogsByTag",
    summary = "List public blogs carrying a tag",
    params(("tag" = String, Path), TagListQuery),
    responses(
        (status = 200, description = "Page of public blogs", body = Envelope<Vec<BlogResponse>>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn get_blogs_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<TagListQuery>,
) -> Result<Json<Envelope<Vec<BlogResponse>>>, AppError> {
    let page = query.page.unwrap_or(PAGE_DEFAULT).max(1);
    let limit = query.limit.unwrap_or(LIMIT_DEFAULT).clamp(1, LIMIT_MAX);

    // Tag listing is a public surface; drafts and private posts never leak.
    let filter = BlogFilter {
        visibility: Some(Visibility::Public),
        tags: Some(vec![tag.to_lowercase()]),
        search: None,
    };

    let (items, total) = state.store.find(filter, page, limit).await?;
    let data = items.into_iter().map(BlogResponse::from).collect();

    Ok(Json(Envelope::page(data, Pagination::new(page, limit, total))))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Create a blog",
    description = "Accepts JSON, or multipart/form-data with `banner`/`images` file fields. \
        Image inputs resolve three ways: uploaded files are pushed to the media store, \
        external URLs are re-hosted, and URLs already on the media store's domain are \
        kept as-is with their public id recovered from the URL.",
    responses(
        (status = 201, description = "Blog created", body = Envelope<BlogResponse>),
        (status = 400, description = "Missing required fields, bad file, or duplicate slug", body = ErrorEnvelope),
        (status = 500, description = "Database failure", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, req))]
pub async fn create_blog(
    State(state): State<AppState>,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_blog_payload(req).await?;

    let title = payload.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let body = payload.body.filter(|b| !b.trim().is_empty());
    let (Some(title), Some(body), Some(banner_input)) = (title, body, payload.banner) else {
        return Err(AppError::Validation(
            "Title, banner, and body are required".into(),
        ));
    };
    validate_lengths(Some(title.as_str()), payload.subtitle.as_deref())?;

    // The banner is required, so its resolution failure fails the request.
    let banner = resolve_image(&*state.media, banner_input).await?;

    // Gallery resolution is best-effort: the record is created with whatever
    // uploaded cleanly.
    let (images, failures) =
        resolve_images(&*state.media, payload.images.unwrap_or_default()).await;
    if !failures.is_empty() {
        tracing::warn!(?failures, "some gallery images failed to upload during create");
    }

    let draft = NewBlog {
        title,
        subtitle: payload.subtitle,
        body,
        banner,
        images,
        tags: payload.tags.unwrap_or_default(),
        visibility: payload.visibility.unwrap_or_default(),
        date: payload.date,
    };

    let saved = state.store.insert(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Blog created successfully",
            BlogResponse::from(saved),
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "updateBlog",
    summary = "Update a blog",
    description = "Accepts JSON or multipart. Replacement banner/images first delete the \
        superseded remote assets (those with a known public id), then resolve the new \
        inputs. Remote failures are logged and never abort the update; there is no \
        rollback between the remote steps and the database write.",
    params(("id" = String, Path, description = "Object id or slug")),
    responses(
        (status = 200, description = "Blog updated", body = Envelope<BlogResponse>),
        (status = 400, description = "Invalid input or duplicate slug", body = ErrorEnvelope),
        (status = 404, description = "Unknown id/slug", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, req))]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Envelope<BlogResponse>>, AppError> {
    let existing = state
        .store
        .find_one(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;
    let record_id = existing
        .id
        .map(|oid| oid.to_hex())
        .ok_or_else(|| AppError::Internal("stored blog is missing its id".into()))?;

    let payload = parse_blog_payload(req).await?;
    validate_lengths(payload.title.as_deref(), payload.subtitle.as_deref())?;

    let mut patch = BlogPatch {
        title: payload.title,
        subtitle: payload.subtitle,
        body: payload.body,
        tags: payload.tags,
        visibility: payload.visibility,
        date: payload.date,
        ..Default::default()
    };

    if let Some(input) = payload.banner {
        let superseded: Vec<String> =
            existing.banner.public_id().map(str::to_string).into_iter().collect();
        delete_superseded(&*state.media, superseded).await;

        match resolve_image(&*state.media, input).await {
            Ok(banner) => patch.banner = Some(banner),
            Err(err) => {
                tracing::warn!(error = %err, "banner upload failed; keeping previous banner")
            }
        }
    }

    if let Some(inputs) = payload.images {
        let superseded: Vec<String> = existing
            .images
            .iter()
            .filter_map(|img| img.public_id().map(str::to_string))
            .collect();
        delete_superseded(&*state.media, superseded).await;

        let (resolved, failures) = resolve_images(&*state.media, inputs).await;
        if !failures.is_empty() {
            tracing::warn!(?failures, "some gallery images failed to upload during update");
        }
        patch.images = Some(resolved);
    }

    let updated = state
        .store
        .update(&record_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;

    Ok(Json(Envelope::with_message(
        "Blog updated successfully",
        BlogResponse::from(updated),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "deleteBlog",
    summary = "Delete a blog and its remote images",
    description = "Collects every public id referenced by the banner and gallery and issues \
        one bulk remote delete (skipped when the set is empty). The database record is \
        removed regardless of the remote outcome.",
    params(("id" = String, Path, description = "Object id or slug")),
    responses(
        (status = 200, description = "Blog deleted", body = Envelope<BlogResponse>),
        (status = 404, description = "Unknown id/slug", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<BlogResponse>>, AppError> {
    let existing = state
        .store
        .find_one(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;
    let record_id = existing
        .id
        .map(|oid| oid.to_hex())
        .ok_or_else(|| AppError::Internal("stored blog is missing its id".into()))?;

    // Remote cleanup first; its outcome never gates the database delete.
    let public_ids = collect_public_ids(&existing.banner, &existing.images);
    delete_superseded(&*state.media, public_ids).await;

    let deleted = state
        .store
        .delete(&record_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;

    Ok(Json(Envelope::with_message(
        "Blog deleted successfully",
        BlogResponse::from(deleted),
    )))
}
