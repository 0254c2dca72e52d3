pub mod blog;
pub mod payload;
pub mod upload;

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Health/info payload for the root route.
#[derive(Serialize, ToSchema)]
pub struct InfoResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Info",
    operation_id = "info",
    summary = "Service health/info",
    responses((status = 200, description = "Service is running", body = InfoResponse)),
)]
pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "Portfolio Blog API",
        status: "Running",
        version: env!("CARGO_PKG_VERSION"),
    })
}
