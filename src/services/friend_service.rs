use std::sync::Arc;

use crate::db::{FriendRepository, UserRepository};
use crate::models::user::{FriendGraph, RegisteredUser, UserResponse};
use crate::services::{ServiceError, UserService};

pub const SEARCH_LIMIT: i64 = 10;

/// Symmetric friendships and the directed requests leading to them
#[derive(Clone)]
pub struct FriendService {
    friends: Arc<dyn FriendRepository>,
    users: UserService,
}

impl FriendService {
    pub fn new(friends: Arc<dyn FriendRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            friends,
            users: UserService::new(users),
        }
    }

    pub async fn send_request(&self, caller: &RegisteredUser, target_id: &str) -> Result<(), ServiceError> {
        if target_id == caller.auth_id {
            return Err(ServiceError::BadRequest(
                "Cannot send friend request to yourself".to_string(),
            ));
        }

        if self.users.find_registered(target_id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        if graph.is_friend(target_id) {
            return Err(ServiceError::BadRequest("Already friends".to_string()));
        }
        if graph.has_sent_to(target_id) {
            return Err(ServiceError::BadRequest("Friend request already sent".to_string()));
        }
        if graph.has_received_from(target_id) {
            return Err(ServiceError::BadRequest(
                "This user has already sent you a friend request".to_string(),
            ));
        }

        self.friends.create_request(&caller.auth_id, target_id).await?;
        tracing::info!("Friend request sent from {} to {}", caller.auth_id, target_id);
        Ok(())
    }

    pub async fn accept_request(&self, caller: &RegisteredUser, sender_id: &str) -> Result<(), ServiceError> {
        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        if !graph.has_received_from(sender_id) {
            tracing::warn!("No pending request from {} to {}", sender_id, caller.auth_id);
            return Err(ServiceError::BadRequest(
                "No pending friend request from this user".to_string(),
            ));
        }

        self.friends.accept_request(sender_id, &caller.auth_id).await?;
        tracing::info!("{} accepted friend request from {}", caller.auth_id, sender_id);
        Ok(())
    }

    pub async fn remove_friend(&self, caller: &RegisteredUser, friend_id: &str) -> Result<(), ServiceError> {
        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        if !graph.is_friend(friend_id) {
            return Err(ServiceError::BadRequest("Not friends with this user".to_string()));
        }

        self.friends.remove_friendship(&caller.auth_id, friend_id).await?;
        tracing::info!("{} removed friend {}", caller.auth_id, friend_id);
        Ok(())
    }

    pub async fn list_friends(&self, caller: &RegisteredUser) -> Result<Vec<UserResponse>, ServiceError> {
        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        self.views(&graph, &graph.friends).await
    }

    pub async fn received_requests(&self, caller: &RegisteredUser) -> Result<Vec<UserResponse>, ServiceError> {
        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        self.views(&graph, &graph.pending_received).await
    }

    pub async fn sent_requests(&self, caller: &RegisteredUser) -> Result<Vec<UserResponse>, ServiceError> {
        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        self.views(&graph, &graph.pending_sent).await
    }

    pub async fn search(&self, caller: &RegisteredUser, query: &str) -> Result<Vec<UserResponse>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let graph = self.friends.friend_graph(&caller.auth_id).await?;
        let found = self.users.search(query, &caller.auth_id, SEARCH_LIMIT).await?;
        Ok(found.iter().map(|user| annotate(&graph, user)).collect())
    }

    pub async fn friend_ids(&self, auth_id: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.friends.friend_graph(auth_id).await?.friends)
    }

    async fn views(&self, graph: &FriendGraph, ids: &[String]) -> Result<Vec<UserResponse>, ServiceError> {
        let users = self.users.registered_users(ids).await?;
        Ok(users.iter().map(|user| annotate(graph, user)).collect())
    }
}

/// Public profile of `user` as seen by the owner of `graph`. Emails of other
/// users are not exposed.
fn annotate(graph: &FriendGraph, user: &RegisteredUser) -> UserResponse {
    UserResponse {
        email: None,
        is_friend: Some(graph.is_friend(&user.auth_id)),
        is_pending_friend: Some(graph.has_sent_to(&user.auth_id)),
        is_pending_request: Some(graph.has_received_from(&user.auth_id)),
        ..UserResponse::from(user)
    }
}
