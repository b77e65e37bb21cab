use serde::{Deserialize, Serialize};

/// Result of a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangedToken {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
}

/// Body of GitHub's access_token endpoint. GitHub answers a bad or expired
/// code with HTTP 200 and the `error` fields set.
#[derive(Debug, Deserialize)]
pub struct TokenEndpointResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Query string GitHub appends to the callback URL
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LinkedResponse {
    pub message: String,
}
