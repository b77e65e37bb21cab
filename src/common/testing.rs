//! In-memory collaborators and request helpers for tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::{AppState, StoreError};
use crate::app::build_app;
use crate::auth::models::{NewUser, User};
use crate::auth::token::Clock;
use crate::auth::{TokenService, UserStore};
use crate::github::client::GithubError;
use crate::github::models::ExchangedToken;
use crate::github::{GithubOAuth, GithubTokenStore};
use crate::links::models::Link;
use crate::links::LinkStore;

pub const TEST_SECRET: &[u8] = b"test-signing-secret";
pub const TEST_CALLBACK_URL: &str = "http://localhost:8080/api/v1/github/auth/callback";

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid start time");
        Self {
            now: Mutex::new(start),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// User store with the same uniqueness rules as the `users` table.
/// `hide_existing` makes the lookups miss so `insert` is the only guard.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    pub hide_existing: bool,
}

impl MemoryUserStore {
    /// Store whose lookups never find anything
    pub fn blind() -> Self {
        Self {
            hide_existing: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        if self.hide_existing {
            return Ok(None);
        }
        Ok(self.get(username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if self.hide_existing {
            return Ok(None);
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("users_username_key".to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        let created = User {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

/// Link store that counts every call, to prove a rejected request never
/// reached it
#[derive(Default)]
pub struct MemoryLinkStore {
    links: Mutex<Vec<Link>>,
    calls: AtomicUsize,
}

impl MemoryLinkStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Link>, StoreError> {
        self.touch();
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, id: &str, user_id: &str, url: &str) -> Result<Link, StoreError> {
        self.touch();
        let now = Utc::now();
        let link = Link {
            id: id.to_string(),
            user_id: user_id.to_string(),
            url: url.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.links.lock().unwrap().push(link.clone());
        Ok(link)
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        url: &str,
    ) -> Result<Option<Link>, StoreError> {
        self.touch();
        let mut links = self.links.lock().unwrap();
        Ok(links
            .iter_mut()
            .find(|l| l.id == id && l.user_id == user_id)
            .map(|l| {
                l.url = url.to_string();
                l.updated_at = Utc::now();
                l.clone()
            }))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        self.touch();
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(links.len() != before)
    }
}

/// Token store keyed by user id. `fail_writes` makes every upsert fail the
/// way a lost database connection would.
#[derive(Default)]
pub struct MemoryGithubTokenStore {
    tokens: Mutex<HashMap<String, ExchangedToken>>,
    pub fail_writes: bool,
}

impl MemoryGithubTokenStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn get(&self, user_id: &str) -> Option<ExchangedToken> {
        self.tokens.lock().unwrap().get(user_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl GithubTokenStore for MemoryGithubTokenStore {
    async fn upsert_for_user(
        &self,
        user_id: &str,
        token: &ExchangedToken,
    ) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.to_string(), token.clone());
        Ok(())
    }
}

/// Provider stand-in: hands out `gho_<code>` for any code unless `reject` is
/// set, and records every exchange attempt
#[derive(Default)]
pub struct FakeGithub {
    pub reject: bool,
    exchanges: Mutex<Vec<(String, String)>>,
}

impl FakeGithub {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// `(code, redirect_uri)` of every exchange attempt
    pub fn exchanges(&self) -> Vec<(String, String)> {
        self.exchanges.lock().unwrap().clone()
    }
}

#[async_trait]
impl GithubOAuth for FakeGithub {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "https://github.test/login/oauth/authorize?redirect_uri={}&state={}",
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExchangedToken, GithubError> {
        self.exchanges
            .lock()
            .unwrap()
            .push((code.to_string(), redirect_uri.to_string()));

        if self.reject {
            return Err(GithubError::Rejected(
                "bad_verification_code: The code passed is incorrect or expired.".to_string(),
            ));
        }
        Ok(ExchangedToken {
            access_token: format!("gho_{}", code),
            token_type: "bearer".to_string(),
            scope: "repo".to_string(),
        })
    }
}

/// Application wired entirely to in-memory collaborators
pub struct TestContext {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUserStore>,
    pub links: Arc<MemoryLinkStore>,
    pub github_tokens: Arc<MemoryGithubTokenStore>,
    pub github: Arc<FakeGithub>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_github(FakeGithub::default())
    }

    pub fn with_github(github: FakeGithub) -> Self {
        Self::build(
            MemoryUserStore::default(),
            github,
            MemoryGithubTokenStore::default(),
        )
    }

    pub fn with_users(users: MemoryUserStore) -> Self {
        Self::build(
            users,
            FakeGithub::default(),
            MemoryGithubTokenStore::default(),
        )
    }

    pub fn with_github_tokens(github_tokens: MemoryGithubTokenStore) -> Self {
        Self::build(MemoryUserStore::default(), FakeGithub::default(), github_tokens)
    }

    fn build(
        users: MemoryUserStore,
        github: FakeGithub,
        github_tokens: MemoryGithubTokenStore,
    ) -> Self {
        let users = Arc::new(users);
        let links = Arc::new(MemoryLinkStore::default());
        let github_tokens = Arc::new(github_tokens);
        let github = Arc::new(github);
        let clock = Arc::new(ManualClock::default());
        let tokens = Arc::new(TokenService::with_clock(
            TEST_SECRET,
            Duration::hours(24),
            clock.clone(),
        ));

        let state = Arc::new(AppState {
            users: users.clone(),
            links: links.clone(),
            github_tokens: github_tokens.clone(),
            github: github.clone(),
            tokens,
            github_callback_url: TEST_CALLBACK_URL.to_string(),
        });

        Self {
            state,
            users,
            links,
            github_tokens,
            github,
            clock,
        }
    }

    pub fn app(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Send one request through a fresh router
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Register through the HTTP surface and return the issued token
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(form_post(
                "/api/v1/auth/register",
                &[("username", username), ("email", email), ("password", password)],
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
        body["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }
}

pub fn form_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
