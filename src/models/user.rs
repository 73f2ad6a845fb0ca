use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user known to the backend. `auth_id` is the subject issued by the
/// identity provider; `username` stays empty until registration completes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub auth_id: String,
    pub username: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_registered(&self) -> bool {
        self.username.as_deref().is_some_and(|name| !name.is_empty())
    }
}

/// A user that has completed registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub auth_id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<User> for RegisteredUser {
    type Error = User;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        match user.username.clone() {
            Some(username) if !username.is_empty() => Ok(Self {
                auth_id: user.auth_id,
                username,
                email: user.email,
                created_at: user.created_at,
            }),
            _ => Err(user),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
}

impl fmt::Display for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username: {}, Email: {}", self.username, self.email)
    }
}

/// Public view of a user, annotated with its relation to the caller
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserResponse {
    pub auth_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_friend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pending_friend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pending_request: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl From<&RegisteredUser> for UserResponse {
    fn from(user: &RegisteredUser) -> Self {
        Self {
            auth_id: user.auth_id.clone(),
            username: user.username.clone(),
            email: Some(user.email.clone()),
            is_friend: None,
            is_pending_friend: None,
            is_pending_request: None,
            created_at: user.created_at,
        }
    }
}

/// Where the caller stands with respect to sign-in and registration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Unauthenticated,
    Unregistered { auth_id: String },
    Registered { user: UserResponse },
}

/// Friends and pending requests of one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendGraph {
    pub friends: Vec<String>,
    pub pending_sent: Vec<String>,
    pub pending_received: Vec<String>,
}

impl FriendGraph {
    pub fn is_friend(&self, user_id: &str) -> bool {
        self.friends.iter().any(|id| id == user_id)
    }

    pub fn has_sent_to(&self, user_id: &str) -> bool {
        self.pending_sent.iter().any(|id| id == user_id)
    }

    pub fn has_received_from(&self, user_id: &str) -> bool {
        self.pending_received.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FriendRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchQuery {
    pub query: String,
}
