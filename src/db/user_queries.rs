use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::db::{RepositoryError, UserRepository};
use crate::models::user::User;

#[derive(Debug, FromRow)]
struct UserRow {
    auth_id: String,
    username: Option<String>,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            auth_id: row.auth_id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so user input only matches literally.
fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_user(&self, auth_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT auth_id, username, email, created_at FROM users WHERE auth_id = $1",
        )
        .bind(auth_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT auth_id, username, email, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_users(&self, auth_ids: &[String]) -> Result<Vec<User>, RepositoryError> {
        if auth_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT auth_id, username, email, created_at
            FROM users
            WHERE auth_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(auth_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn save_user(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (auth_id, username, email, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (auth_id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&user.auth_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let violated = e
                .as_database_error()
                .filter(|db_error| db_error.is_unique_violation())
                .map(|db_error| db_error.constraint().unwrap_or("users_username_key").to_string());
            match violated {
                Some(constraint) => {
                    tracing::warn!("Username {:?} already owned by another user", user.username);
                    RepositoryError::UniqueViolation(constraint)
                }
                None => {
                    tracing::error!("Failed to save user {}: {:?}", user.auth_id, e);
                    RepositoryError::Database(e)
                }
            }
        })?;
        Ok(())
    }

    async fn search_users(
        &self,
        prefix: &str,
        exclude_auth_id: &str,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT auth_id, username, email, created_at
            FROM users
            WHERE username ILIKE $1 AND auth_id <> $2
            ORDER BY username
            LIMIT $3
            "#,
        )
        .bind(like_prefix(prefix))
        .bind(exclude_auth_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
