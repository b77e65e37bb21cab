use super::handlers;
use axum::{
    routing::{get, put},
    Router,
};

/// Creates the links router; the caller layers the authorization gate on top
pub fn links_routes() -> Router {
    Router::new()
        .route(
            "/links",
            get(handlers::list_links).post(handlers::create_link),
        )
        .route(
            "/links/:id",
            put(handlers::update_link).delete(handlers::delete_link),
        )
}
