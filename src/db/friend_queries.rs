use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{FriendRepository, RepositoryError};
use crate::models::user::FriendGraph;

#[derive(Debug)]
pub struct PgFriendRepository {
    pool: PgPool,
}

impl PgFriendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for PgFriendRepository {
    async fn friend_graph(&self, auth_id: &str) -> Result<FriendGraph, RepositoryError> {
        let friends: Vec<(String,)> = sqlx::query_as(
            "SELECT friend_id FROM friendships WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(auth_id)
        .fetch_all(&self.pool)
        .await?;

        let sent: Vec<(String,)> = sqlx::query_as(
            "SELECT receiver_id FROM friend_requests WHERE sender_id = $1 ORDER BY created_at",
        )
        .bind(auth_id)
        .fetch_all(&self.pool)
        .await?;

        let received: Vec<(String,)> = sqlx::query_as(
            "SELECT sender_id FROM friend_requests WHERE receiver_id = $1 ORDER BY created_at",
        )
        .bind(auth_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(FriendGraph {
            friends: friends.into_iter().map(|(id,)| id).collect(),
            pending_sent: sent.into_iter().map(|(id,)| id).collect(),
            pending_received: received.into_iter().map(|(id,)| id).collect(),
        })
    }

    async fn create_request(&self, from: &str, to: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO friend_requests (sender_id, receiver_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (sender_id, receiver_id) DO NOTHING
            "#,
        )
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn accept_request(&self, from: &str, to: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM friend_requests WHERE sender_id = $1 AND receiver_id = $2")
            .bind(from)
            .bind(to)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id, created_at)
            VALUES ($1, $2, NOW()), ($2, $1, NOW())
            ON CONFLICT (user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_friendship(&self, user_id: &str, friend_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
