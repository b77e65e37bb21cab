use async_trait::async_trait;
use sqlx::PgPool;

use super::models::ExchangedToken;
use crate::common::StoreError;

/// Repository of linked GitHub tokens; at most one per user
#[async_trait]
pub trait GithubTokenStore: Send + Sync {
    /// Insert the user's token or overwrite the existing one
    async fn upsert_for_user(&self, user_id: &str, token: &ExchangedToken)
        -> Result<(), StoreError>;
}

pub struct PgGithubTokenStore {
    db: PgPool,
}

impl PgGithubTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GithubTokenStore for PgGithubTokenStore {
    async fn upsert_for_user(
        &self,
        user_id: &str,
        token: &ExchangedToken,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO github_tokens (user_id, access_token, token_type, scope)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = excluded.access_token,
                token_type = excluded.token_type,
                scope = excluded.scope,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&token.access_token)
        .bind(&token.token_type)
        .bind(&token.scope)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
