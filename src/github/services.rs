//! Account-linking flow over the authorization-code grant

use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::GithubOAuth;
use super::models::CallbackParams;
use super::store::GithubTokenStore;
use crate::auth::{TokenService, UserStore};
use crate::common::ApiError;

pub struct GithubLinkService {
    github: Arc<dyn GithubOAuth>,
    users: Arc<dyn UserStore>,
    store: Arc<dyn GithubTokenStore>,
    tokens: Arc<TokenService>,
    callback_url: String,
}

impl GithubLinkService {
    pub fn new(
        github: Arc<dyn GithubOAuth>,
        users: Arc<dyn UserStore>,
        store: Arc<dyn GithubTokenStore>,
        tokens: Arc<TokenService>,
        callback_url: String,
    ) -> Self {
        Self {
            github,
            users,
            store,
            tokens,
            callback_url,
        }
    }

    /// Provider URL for `user_id` to grant access, carrying a signed `state`
    /// that names the user
    pub fn authorization_redirect(&self, user_id: &str) -> Result<String, ApiError> {
        let state = self.tokens.issue_oauth_state(user_id).map_err(|e| {
            error!(error = %e, user_id = %user_id, "Failed to sign OAuth state");
            ApiError::InternalServer("oauth state signing failed".to_string())
        })?;

        info!(user_id = %user_id, "Starting GitHub OAuth flow");
        Ok(self.github.authorization_url(&self.callback_url, &state))
    }

    /// Finish the flow from GitHub's callback query and store the token.
    /// Returns the id of the user the account was linked to.
    ///
    /// Every precondition is checked before the exchange; a callback that
    /// fails one never reaches the provider. No failure here is a 500: the
    /// browser landed on this route from GitHub and gets a retry link instead.
    pub async fn complete(&self, params: CallbackParams) -> Result<String, ApiError> {
        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or_default();
            return Err(ApiError::OAuthDenied(format!("{}: {}", error, description)));
        }

        let code = params
            .code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::OAuthMalformedCallback("missing code".to_string()))?;

        let state = params
            .state
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::OAuthMalformedCallback("missing state".to_string()))?;

        let user_id = self.tokens.verify_oauth_state(&state).map_err(|e| {
            warn!(reason = e.as_str(), "OAuth state rejected");
            ApiError::OAuthMalformedCallback(format!("state rejected: {}", e))
        })?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(|e| ApiError::OAuthLinkFailed(format!("user lookup failed: {}", e)))?;
        if user.is_none() {
            return Err(ApiError::OAuthMalformedCallback(format!(
                "state names unknown user {}",
                user_id
            )));
        }

        let token = self
            .github
            .exchange_code(&code, &self.callback_url)
            .await
            .map_err(|e| ApiError::OAuthExchangeFailed(e.to_string()))?;

        self.store
            .upsert_for_user(&user_id, &token)
            .await
            .map_err(|e| ApiError::OAuthLinkFailed(format!("token not stored: {}", e)))?;

        info!(user_id = %user_id, scope = %token.scope, "GitHub account linked");
        Ok(user_id)
    }
}
