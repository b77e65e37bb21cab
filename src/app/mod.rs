//! Router composition

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{auth_routes, require_auth};
use crate::common::{AppState, API_BASE_PATH};
use crate::github::github_routes;
use crate::links::links_routes;


/// Every API route under `API_BASE_PATH`, with the gate layered onto the
/// protected ones
pub fn api_routes() -> Router {
    let protected = links_routes().route_layer(middleware::from_fn(require_auth));

    Router::new()
        .merge(auth_routes())
        .merge(github_routes())
        .merge(protected)
}

/// The complete application minus transport concerns (CORS, tracing)
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest(API_BASE_PATH, api_routes())
        .fallback(not_found)
        .layer(Extension(state))
}

/// GET /ping
async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

async fn not_found(request: Request) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not found",
            "path": request.uri().path(),
            "method": request.method().as_str(),
        })),
    )
}
