use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /links` and `PUT /links/:id`
#[derive(Deserialize, Debug)]
pub struct LinkRequest {
    pub url: String,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
