//! Authentication handlers

use axum::extract::{rejection::FormRejection, Extension, Form, Json};
use std::sync::Arc;

use super::models::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use super::services::AuthService;
use crate::common::{ApiError, AppState};

/// POST /api/v1/auth/register
/// Creates an account from form fields `username`, `email`, `password`
///
/// # Response
/// ```json
/// {
///   "token": "<jwt token>",
///   "expires_at": "2024-01-02T00:00:00Z",
///   "user": { "id": "U_...", "username": "...", "email": "...", "created_at": "..." }
/// }
/// ```
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<RegisterRequest>, FormRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Form(request) = form.map_err(|e| ApiError::ValidationError(e.body_text()))?;

    let service = AuthService::new(state.users.clone(), state.tokens.clone());
    let registered = service.register(request).await?;

    Ok(Json(registered))
}

/// POST /api/v1/auth/login
/// Exchanges form fields `username`, `password` for a session token
///
/// # Response
/// ```json
/// {
///   "token": "<jwt token>",
///   "expires_at": "2024-01-02T00:00:00Z"
/// }
/// ```
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(request) = form.map_err(|e| ApiError::ValidationError(e.body_text()))?;

    let service = AuthService::new(state.users.clone(), state.tokens.clone());
    let issued = service.login(request).await?;

    Ok(Json(issued))
}
