//! Persistence for users, friendships and matches.
//!
//! Services talk to the storage through the repository traits below so that
//! the same code runs against Postgres in production and the in-memory store
//! in tests and local demos.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::models::football_match::{Match, MatchFilter};
use crate::models::user::{FriendGraph, User};

pub mod friend_queries;
pub mod match_queries;
pub mod memory;
pub mod user_queries;

pub use friend_queries::PgFriendRepository;
pub use match_queries::PgMatchRepository;
pub use memory::InMemoryStore;
pub use user_queries::PgUserRepository;

#[derive(Debug, ThisError)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored record could not be read: {0}")]
    Corrupt(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, RepositoryError>;

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError>;

    /// Insert or update the match. Players and validations are append-only:
    /// entries already stored for a `(match, user)` pair are left untouched.
    async fn save_match(&self, football_match: &Match) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, auth_id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_users(&self, auth_ids: &[String]) -> Result<Vec<User>, RepositoryError>;

    /// Insert or update the user. Fails with `UniqueViolation` when another
    /// user already owns the username.
    async fn save_user(&self, user: &User) -> Result<(), RepositoryError>;

    /// Registered users whose username starts with `prefix`, ignoring case.
    async fn search_users(
        &self,
        prefix: &str,
        exclude_auth_id: &str,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError>;
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn friend_graph(&self, auth_id: &str) -> Result<FriendGraph, RepositoryError>;

    async fn create_request(&self, from: &str, to: &str) -> Result<(), RepositoryError>;

    /// Drop the pending request from `from` to `to` and record the friendship
    /// in both directions.
    async fn accept_request(&self, from: &str, to: &str) -> Result<(), RepositoryError>;

    async fn remove_friendship(&self, user_id: &str, friend_id: &str) -> Result<(), RepositoryError>;
}

/// The set of repositories the application runs on
#[derive(Clone)]
pub struct Repositories {
    pub matches: Arc<dyn MatchRepository>,
    pub users: Arc<dyn UserRepository>,
    pub friends: Arc<dyn FriendRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            matches: Arc::new(PgMatchRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            friends: Arc::new(PgFriendRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::default()))
    }

    pub fn from_store(store: Arc<InMemoryStore>) -> Self {
        Self {
            matches: store.clone(),
            users: store.clone(),
            friends: store,
        }
    }
}
