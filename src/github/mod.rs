//! # GitHub Module
//!
//! Links a GitHub account to a user through the OAuth2 authorization-code
//! grant:
//! - `GET /github/auth` redirects the signed-in user to GitHub with a signed `state`
//! - `GET /github/auth/callback` exchanges the returned code and stores the token

pub mod client;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;


pub use client::{GithubClient, GithubOAuth};
pub use routes::github_routes;
pub use store::{GithubTokenStore, PgGithubTokenStore};
