//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Password hashing and verification (bcrypt)
//! - Session token issuance and verification (HS256 JWT)
//! - The authorization gate protecting routes (`require_auth`, `AuthedUser`)
//! - Registration and login

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod store;
pub mod token;
pub mod validators;


pub use extractors::{require_auth, AuthedUser};
pub use routes::auth_routes;
pub use store::{PgUserStore, UserStore};
pub use token::TokenService;
