// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

/// Prefix every API route is nested under
pub const API_BASE_PATH: &str = "/api/v1";

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, StoreError};
pub use helpers::{safe_email_log, safe_token_log};
pub use id_generator::*;
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
