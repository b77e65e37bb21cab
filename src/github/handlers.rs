use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::models::{CallbackParams, LinkedResponse};
use super::services::GithubLinkService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

fn link_service(state: &AppState) -> GithubLinkService {
    GithubLinkService::new(
        state.github.clone(),
        state.users.clone(),
        state.github_tokens.clone(),
        state.tokens.clone(),
        state.github_callback_url.clone(),
    )
}

/// GET /api/v1/github/auth - 302 to GitHub's consent page
pub async fn start_github_link(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let url = link_service(&state).authorization_redirect(&user.id)?;
    Ok((StatusCode::FOUND, [(LOCATION, url)]))
}

/// GET /api/v1/github/auth/callback - complete the exchange
///
/// Not behind the gate: the browser arrives from GitHub without our bearer
/// token, so the user comes from the signed `state` instead.
pub async fn github_callback(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Json<LinkedResponse>, ApiError> {
    let Query(params) =
        params.map_err(|e| ApiError::OAuthMalformedCallback(e.body_text()))?;

    link_service(&state).complete(params).await?;

    Ok(Json(LinkedResponse {
        message: "GitHub account linked".to_string(),
    }))
}
