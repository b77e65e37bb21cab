// src/github/client.rs
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use super::models::{ExchangedToken, TokenEndpointResponse};
use crate::common::config::GithubConfig;

/// Upper bound on the server-to-server exchange call
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("code rejected by provider: {0}")]
    Rejected(String),

    #[error("unexpected token response: {0}")]
    InvalidResponse(String),
}

/// The provider half of the authorization-code grant
#[async_trait]
pub trait GithubOAuth: Send + Sync {
    /// URL the browser is sent to for consent
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Trade an authorization code for an access token. One attempt, no retry.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExchangedToken, GithubError>;
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .user_agent(concat!("sentrylink/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl GithubOAuth for GithubClient {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.config.scopes),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExchangedToken, GithubError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        debug!("Exchanging GitHub authorization code for an access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "GitHub token request failed");
                GithubError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %body, "GitHub token exchange failed");
            return Err(GithubError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<TokenEndpointResponse>()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))?;

        if let Some(code) = body.error {
            let description = body.error_description.unwrap_or_default();
            return Err(GithubError::Rejected(format!("{}: {}", code, description)));
        }

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GithubError::InvalidResponse("missing access_token".to_string()))?;

        info!("GitHub authorization code exchanged");
        Ok(ExchangedToken {
            access_token,
            token_type: body.token_type.unwrap_or_else(|| "bearer".to_string()),
            scope: body.scope.unwrap_or_default(),
        })
    }
}
