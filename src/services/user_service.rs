use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::auth::jwt::Claims;
use crate::db::{RepositoryError, UserRepository};
use crate::models::user::{RegisteredUser, RegistrationRequest, SessionStatus, User, UserResponse};
use crate::services::ServiceError;

const MAX_USERNAME_LENGTH: usize = 50;

/// Registration and caller resolution
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn session_status(&self, claims: Option<&Claims>) -> Result<SessionStatus, ServiceError> {
        let Some(claims) = claims else {
            return Ok(SessionStatus::Unauthenticated);
        };

        let user = self.users.find_user(claims.auth_id()).await?;
        match user.map(RegisteredUser::try_from) {
            Some(Ok(registered)) => Ok(SessionStatus::Registered {
                user: UserResponse::from(&registered),
            }),
            _ => Ok(SessionStatus::Unregistered {
                auth_id: claims.auth_id().to_string(),
            }),
        }
    }

    /// The caller as a registered user, or `Forbidden` when registration is
    /// still outstanding.
    pub async fn require_registered(&self, claims: &Claims) -> Result<RegisteredUser, ServiceError> {
        self.users
            .find_user(claims.auth_id())
            .await?
            .and_then(|user| RegisteredUser::try_from(user).ok())
            .ok_or_else(|| ServiceError::Forbidden("User not registered".to_string()))
    }

    pub async fn register(
        &self,
        claims: &Claims,
        request: &RegistrationRequest,
    ) -> Result<RegisteredUser, ServiceError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ServiceError::BadRequest("Username cannot be empty".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(ServiceError::BadRequest(format!(
                "Username too long (maximum {} characters)",
                MAX_USERNAME_LENGTH
            )));
        }

        if let Some(owner) = self.users.find_by_username(username).await? {
            if owner.auth_id != claims.auth_id() {
                tracing::warn!("Username '{}' is already taken", username);
                return Err(ServiceError::Conflict("Username already taken".to_string()));
            }
        }

        if let Some(existing) = self.users.find_user(claims.auth_id()).await? {
            if existing.is_registered() {
                tracing::warn!(
                    "User {} is already registered as {:?}",
                    claims.auth_id(),
                    existing.username
                );
                return Err(ServiceError::Conflict("User already registered".to_string()));
            }
        }

        let user = User {
            auth_id: claims.auth_id().to_string(),
            username: Some(username.to_string()),
            email: request.email.trim().to_string(),
            created_at: Utc::now(),
        };
        // A concurrent registration can still claim the name between check and save
        self.users.save_user(&user).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => {
                tracing::warn!("Username '{}' was taken concurrently", username);
                ServiceError::Conflict("Username already taken".to_string())
            }
            other => ServiceError::Repository(other),
        })?;
        tracing::info!("Registered user {} as {}", user.auth_id, username);

        RegisteredUser::try_from(user)
            .map_err(|_| ServiceError::BadRequest("Username cannot be empty".to_string()))
    }

    /// Username lookup for the given ids; unknown ids are simply absent.
    pub async fn usernames(&self, auth_ids: &[String]) -> Result<HashMap<String, String>, ServiceError> {
        let users = self.users.find_users(auth_ids).await?;
        Ok(users
            .into_iter()
            .filter_map(|user| user.username.map(|name| (user.auth_id, name)))
            .collect())
    }

    pub async fn registered_users(&self, auth_ids: &[String]) -> Result<Vec<RegisteredUser>, ServiceError> {
        let users = self.users.find_users(auth_ids).await?;
        let mut registered: Vec<RegisteredUser> = users
            .into_iter()
            .filter_map(|user| RegisteredUser::try_from(user).ok())
            .collect();
        // keep the caller's ordering
        registered.sort_by_key(|user| {
            auth_ids
                .iter()
                .position(|id| *id == user.auth_id)
                .unwrap_or(usize::MAX)
        });
        Ok(registered)
    }

    pub async fn find_registered(&self, auth_id: &str) -> Result<Option<RegisteredUser>, ServiceError> {
        Ok(self
            .users
            .find_user(auth_id)
            .await?
            .and_then(|user| RegisteredUser::try_from(user).ok()))
    }

    pub async fn search(
        &self,
        prefix: &str,
        exclude_auth_id: &str,
        limit: i64,
    ) -> Result<Vec<RegisteredUser>, ServiceError> {
        let users = self.users.search_users(prefix, exclude_auth_id, limit).await?;
        Ok(users
            .into_iter()
            .filter_map(|user| RegisteredUser::try_from(user).ok())
            .collect())
    }
}
