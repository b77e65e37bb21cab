// src/main.rs
use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod github;
mod links;

use auth::{PgUserStore, TokenService};
use common::{AppConfig, AppState};
use github::{GithubClient, PgGithubTokenStore};
use links::PgLinkStore;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env().context("invalid startup configuration")?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(config.database.connect_options())
        .await
        .context("failed to connect to database")?;
    info!(
        host = %config.database.host,
        database = %config.database.name,
        "Connection to database established"
    );

    common::migrations::run_migrations(&pool, config.reset_db)
        .await
        .context("database migration failed")?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl,
    ));
    info!(ttl_hours = config.jwt_ttl.num_hours(), "TokenService initialized");

    let github = Arc::new(GithubClient::new(config.github.clone())?);
    info!("GithubClient initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = AppState {
        users: Arc::new(PgUserStore::new(pool.clone())),
        links: Arc::new(PgLinkStore::new(pool.clone())),
        github_tokens: Arc::new(PgGithubTokenStore::new(pool)),
        github,
        tokens,
        github_callback_url: config.github_callback_url(),
    };

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app = app::build_app(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app_port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
