pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowHeaders, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portfolio Blog API",
        version = "1.0.0",
        description = "CRUD API for blog posts with hosted image assets"
    ),
    paths(
        handlers::info,
        handlers::blog::list_blogs,
        handlers::blog::get_blog,
        handlers::blog::get_blog_by_slug,
        handlers::blog::get_blogs_by_tag,
        handlers::blog::create_blog,
        handlers::blog::update_blog,
        handlers::blog::delete_blog,
        handlers::upload::upload_image,
        handlers::upload::upload_multiple_images,
        handlers::upload::upload_image_from_url,
        handlers::upload::delete_image,
    ),
    components(schemas(
        crate::entity::blog::ImageRef,
        crate::entity::blog::Visibility,
        crate::error::ErrorEnvelope,
        crate::models::blog::BlogJsonBody,
        crate::models::blog::BlogResponse,
        crate::models::shared::Pagination,
        crate::models::upload::BatchUploadResponse,
        crate::models::upload::DeleteImageResponse,
        crate::models::upload::FailedUpload,
        crate::models::upload::UploadFromUrlRequest,
        crate::models::upload::UploadedImageResponse,
    )),
    tags(
        (name = "Info", description = "Service status"),
        (name = "Blogs", description = "Blog CRUD with image reconciliation"),
        (name = "Uploads", description = "Standalone media store passthroughs"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .route("/", get(handlers::info))
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
}
