// Application state shared across all modules

use std::sync::Arc;

use crate::auth::{TokenService, UserStore};
use crate::github::{GithubOAuth, GithubTokenStore};
use crate::links::LinkStore;

/// Immutable per-process state handed to every handler through an
/// `Extension<Arc<AppState>>` layer
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub links: Arc<dyn LinkStore>,
    pub github_tokens: Arc<dyn GithubTokenStore>,
    pub github: Arc<dyn GithubOAuth>,
    pub tokens: Arc<TokenService>,
    pub github_callback_url: String,
}
