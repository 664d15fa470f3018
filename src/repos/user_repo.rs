/*
 * Responsibility
 * - Read-only access to the users table
 * - UserLookup is the seam the resolver depends on (DbSession in production)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::db::DbSession;
use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserLookup: Send {
    async fn find_user_by_id(&mut self, id: i64) -> RepoResult<Option<UserRow>>;
}

#[async_trait]
impl UserLookup for DbSession {
    async fn find_user_by_id(&mut self, id: i64) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.connection().await?)
        .await?;

        Ok(row)
    }
}
