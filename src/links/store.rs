use async_trait::async_trait;
use sqlx::PgPool;

use super::models::Link;
use crate::common::StoreError;

/// Repository of links. Every method is scoped to the owning user; an id that
/// belongs to someone else behaves as if it did not exist.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Link>, StoreError>;
    async fn create(&self, id: &str, user_id: &str, url: &str) -> Result<Link, StoreError>;
    async fn update(
        &self,
        user_id: &str,
        id: &str,
        url: &str,
    ) -> Result<Option<Link>, StoreError>;
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;
}

pub struct PgLinkStore {
    db: PgPool,
}

impl PgLinkStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Link>, StoreError> {
        let links = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, user_id, url, created_at, updated_at
            FROM links
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(links)
    }

    async fn create(&self, id: &str, user_id: &str, url: &str) -> Result<Link, StoreError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (id, user_id, url)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(url)
        .fetch_one(&self.db)
        .await?;
        Ok(link)
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        url: &str,
    ) -> Result<Option<Link>, StoreError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links SET url = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.db)
        .await?;
        Ok(link)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
