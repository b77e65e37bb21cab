use super::handlers;
use axum::{routing::get, Router};

/// Creates the GitHub account-linking router
pub fn github_routes() -> Router {
    Router::new()
        .route("/github/auth", get(handlers::start_github_link))
        .route("/github/auth/callback", get(handlers::github_callback))
}
