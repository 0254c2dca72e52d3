use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/blogs", blog_routes())
}

fn blog_routes() -> Router<AppState> {
    let crud = Router::new()
        .route(
            "/",
            get(handlers::blog::list_blogs).post(handlers::blog::create_blog),
        )
        .route("/slug/{slug}", get(handlers::blog::get_blog_by_slug))
        .route("/tag/{tag}", get(handlers::blog::get_blogs_by_tag))
        .route(
            "/{id}",
            get(handlers::blog::get_blog)
                .put(handlers::blog::update_blog)
                .delete(handlers::blog::delete_blog),
        )
        .layer(handlers::payload::blog_body_limit());

    let uploads = Router::new()
        .route("/upload-image", post(handlers::upload::upload_image))
        .route(
            "/upload/multiple",
            post(handlers::upload::upload_multiple_images),
        )
        .route("/upload/url", post(handlers::upload::upload_image_from_url))
        .route("/image/{public_id}", delete(handlers::upload::delete_image))
        .layer(handlers::upload::upload_body_limit());

    crud.merge(uploads)
}
