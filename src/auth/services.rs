//! Registration and login

use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{
    LoginRequest, NewUser, RegisterRequest, RegisterResponse, TokenResponse, User,
};
use super::password::{dummy_hash, hash_password, password_matches};
use super::store::UserStore;
use super::token::TokenService;
use crate::common::{generate_user_id, safe_email_log, ApiError, StoreError, Validator};

pub const INVALID_CREDENTIALS: &str = "invalid username or password";
pub const ALREADY_REGISTERED: &str = "username or email already registered";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Create an account and sign a session token for it
    ///
    /// The lookups before the insert only short-circuit the common case; the
    /// UNIQUE constraints behind `UserStore::insert` decide concurrent races.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, ApiError> {
        request.validate().into_result()?;

        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();

        if self.users.find_by_username(&username).await?.is_some() {
            info!(username = %username, "Registration rejected: username taken");
            return Err(ApiError::Conflict(ALREADY_REGISTERED.to_string()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            info!(email = %safe_email_log(&email), "Registration rejected: email taken");
            return Err(ApiError::Conflict(ALREADY_REGISTERED.to_string()));
        }

        let password_hash = hash_blocking(request.password).await?;

        let user = match self
            .users
            .insert(NewUser {
                id: generate_user_id(),
                username,
                email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::Conflict(constraint)) => {
                info!(constraint = %constraint, "Registration lost a uniqueness race");
                return Err(ApiError::Conflict(ALREADY_REGISTERED.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let issued = self.issue_for(&user)?;
        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "User registered"
        );

        Ok(RegisterResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Check credentials and sign a session token
    ///
    /// An unknown username and a wrong password produce the same error; only
    /// the log line tells them apart.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ApiError> {
        // Input that could never match a stored hash is just another failed login
        if !request.validate().is_valid {
            warn!(reason = "unusable_credentials", "Login failed");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let user = self.users.find_by_username(request.username.trim()).await?;
        let stored_hash = user
            .as_ref()
            .map_or_else(|| dummy_hash().to_string(), |u| u.password_hash.clone());

        let matched = matches_blocking(stored_hash, request.password).await?;

        match user {
            Some(user) if matched => {
                let issued = self.issue_for(&user)?;
                info!(user_id = %user.id, "User logged in");
                Ok(issued)
            }
            Some(user) => {
                warn!(user_id = %user.id, reason = "password_mismatch", "Login failed");
                Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
            None => {
                warn!(reason = "unknown_user", "Login failed");
                Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    fn issue_for(&self, user: &User) -> Result<TokenResponse, ApiError> {
        let (token, expires_at) = self.tokens.issue(&user.id).map_err(|e| {
            error!(error = %e, user_id = %user.id, "JWT encoding error");
            ApiError::InternalServer("jwt error".to_string())
        })?;
        Ok(TokenResponse { token, expires_at })
    }
}

async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalServer(format!("hashing task failed: {}", e)))?
        .map_err(|e| ApiError::InternalServer(e.to_string()))
}

async fn matches_blocking(hashed: String, password: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || password_matches(&hashed, &password))
        .await
        .map_err(|e| ApiError::InternalServer(format!("verification task failed: {}", e)))
}
