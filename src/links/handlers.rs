use super::models::{LinkRequest, MessageResponse};
use crate::auth::AuthedUser;
use crate::common::{generate_link_id, ApiError, AppState, Validator};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

fn parse_body(body: Result<Json<LinkRequest>, JsonRejection>) -> Result<LinkRequest, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::ValidationError(e.body_text()))?;
    request.validate().into_result()?;
    Ok(request)
}

/// GET /api/v1/links - The caller's links, oldest first
pub async fn list_links(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let links = state.links.list_for_user(&user.id).await?;
    Ok(Json(links))
}

/// POST /api/v1/links - Save a link
pub async fn create_link(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    body: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_body(body)?;

    let link = state
        .links
        .create(&generate_link_id(), &user.id, request.url.trim())
        .await?;

    info!(user_id = %user.id, link_id = %link.id, "Link created");
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/v1/links/:id - Replace a link's URL
pub async fn update_link(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(link_id): Path<String>,
    body: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_body(body)?;

    let link = state
        .links
        .update(&user.id, &link_id, request.url.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Link not found".to_string()))?;

    Ok(Json(link))
}

/// DELETE /api/v1/links/:id - Delete a link
pub async fn delete_link(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(link_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.links.delete(&user.id, &link_id).await? {
        return Err(ApiError::NotFound("Link not found".to_string()));
    }

    info!(user_id = %user.id, link_id = %link_id, "Link deleted");
    Ok(Json(MessageResponse {
        message: "Link deleted successfully".to_string(),
    }))
}
