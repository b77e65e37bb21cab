//! Authorization gate for Axum
//!
//! `require_auth` guards whole routers; `AuthedUser` is the extractor handlers
//! use to read the caller. Both go through [`authenticate`], which only
//! consults the immutable token service.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::token::TokenService;
use crate::common::error::UNAUTHORIZED_MESSAGE;
use crate::common::{safe_token_log, ApiError, AppState};

pub const MISSING_TOKEN_MESSAGE: &str = "missing token";

/// Caller resolved from a verified session token
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
}

/// Resolve the bearer token in `headers` to a user
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthedUser, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let token = match token {
        Some(t) => t,
        None => {
            warn!("Authentication failed: missing bearer token");
            return Err(ApiError::Unauthorized(MISSING_TOKEN_MESSAGE.to_string()));
        }
    };

    match tokens.verify(token) {
        Ok(id) => {
            debug!(user_id = %id, "Bearer token accepted");
            Ok(AuthedUser { id })
        }
        Err(e) => {
            warn!(
                reason = e.as_str(),
                token = %safe_token_log(token),
                "Authentication failed: token rejected"
            );
            Err(ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
        }
    }
}

/// Middleware rejecting any request without a valid session token before it
/// reaches a handler. On success the caller is stored in the request
/// extensions for `AuthedUser` to pick up.
pub async fn require_auth(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), &state.tokens)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthedUser>() {
            return Ok(user.clone());
        }

        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        authenticate(&parts.headers, &app_state.tokens)
    }
}
