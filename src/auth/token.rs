//! Session token issuance and verification
//!
//! Tokens are HS256 JWTs signed with the process-wide secret handed to
//! [`TokenService::new`]. Nothing is stored server side: a token is valid
//! exactly when its signature checks out, its `kind` matches the use, and the
//! current time is before `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;
use thiserror::Error;

use super::models::{Claims, TokenKind};

/// Lifetime of the `state` parameter carried through the GitHub round trip
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Why a presented token was refused. Logged, never shown to the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Short tag for structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenSignError {
    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry out of range")]
    ExpiryOverflow,
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against `clock` below rather than the library's
        // own wall-clock read
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }

    /// Sign a session token for `subject`, returning it with its expiry
    pub fn issue(&self, subject: &str) -> Result<(String, DateTime<Utc>), TokenSignError> {
        self.sign(subject, TokenKind::Session, self.ttl)
    }

    /// Resolve a session token to the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.check(token, TokenKind::Session)
    }

    /// Sign the short-lived `state` value for a GitHub authorization request
    pub fn issue_oauth_state(&self, subject: &str) -> Result<String, TokenSignError> {
        self.sign(
            subject,
            TokenKind::OauthState,
            Duration::minutes(OAUTH_STATE_TTL_MINUTES),
        )
        .map(|(state, _)| state)
    }

    /// Resolve a returned `state` value to the user who started the flow
    pub fn verify_oauth_state(&self, state: &str) -> Result<String, TokenError> {
        self.check(state, TokenKind::OauthState)
    }

    fn sign(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), TokenSignError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenSignError::ExpiryOverflow)?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            kind,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, expires_at))
    }

    fn check(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;
        let claims = decoded.claims;

        if claims.kind != expected || claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }
}
