//! In-process store implementing every repository trait. Backs the
//! integration tests and `database.in_memory` deployments.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{FriendRepository, MatchRepository, RepositoryError, UserRepository};
use crate::models::football_match::{Match, MatchFilter};
use crate::models::user::{FriendGraph, User};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    matches: Vec<Match>,
    // (user_id, friend_id), stored in both directions
    friendships: Vec<(String, String)>,
    // (sender_id, receiver_id)
    requests: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

/// Merge an incoming match into the stored one without rewriting existing
/// per-user entries.
fn merge_append_only(stored: &Match, incoming: &Match) -> Match {
    let mut players = stored.players().to_vec();
    for player in incoming.players() {
        if !players.iter().any(|p| p.user_id == player.user_id) {
            players.push(player.clone());
        }
    }

    let mut validations = stored.validations().to_vec();
    for validation in incoming.validations() {
        if !validations.iter().any(|v| v.user_id == validation.user_id) {
            validations.push(validation.clone());
        }
    }

    Match::restore(
        stored.match_id,
        stored.created_by.clone(),
        stored.details.clone(),
        stored.created_at,
        players,
        validations,
    )
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, RepositoryError> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.details
                .date
                .cmp(&a.details.date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(matches)
    }

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.match_id == match_id).cloned())
    }

    async fn save_match(&self, football_match: &Match) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let existing = state
            .matches
            .iter()
            .position(|m| m.match_id == football_match.match_id);
        match existing {
            Some(index) => {
                let merged = merge_append_only(&state.matches[index], football_match);
                state.matches[index] = merged;
            }
            None => state.matches.push(football_match.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, auth_id: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.auth_id == auth_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn find_users(&self, auth_ids: &[String]) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| auth_ids.contains(&u.auth_id))
            .cloned()
            .collect())
    }

    async fn save_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let taken = user.username.is_some()
            && state
                .users
                .iter()
                .any(|u| u.auth_id != user.auth_id && u.username == user.username);
        if taken {
            return Err(RepositoryError::UniqueViolation("users_username_key".to_string()));
        }
        match state.users.iter().position(|u| u.auth_id == user.auth_id) {
            Some(index) => state.users[index] = user.clone(),
            None => state.users.push(user.clone()),
        }
        Ok(())
    }

    async fn search_users(
        &self,
        prefix: &str,
        exclude_auth_id: &str,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.read().await;
        let prefix = prefix.to_lowercase();
        let mut found: Vec<User> = state
            .users
            .iter()
            .filter(|u| u.auth_id != exclude_auth_id)
            .filter(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().starts_with(&prefix))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }
}

#[async_trait]
impl FriendRepository for InMemoryStore {
    async fn friend_graph(&self, auth_id: &str) -> Result<FriendGraph, RepositoryError> {
        let state = self.state.read().await;
        Ok(FriendGraph {
            friends: state
                .friendships
                .iter()
                .filter(|(user, _)| user == auth_id)
                .map(|(_, friend)| friend.clone())
                .collect(),
            pending_sent: state
                .requests
                .iter()
                .filter(|(sender, _)| sender == auth_id)
                .map(|(_, receiver)| receiver.clone())
                .collect(),
            pending_received: state
                .requests
                .iter()
                .filter(|(_, receiver)| receiver == auth_id)
                .map(|(sender, _)| sender.clone())
                .collect(),
        })
    }

    async fn create_request(&self, from: &str, to: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let request = (from.to_string(), to.to_string());
        if !state.requests.contains(&request) {
            state.requests.push(request);
        }
        Ok(())
    }

    async fn accept_request(&self, from: &str, to: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .requests
            .retain(|(sender, receiver)| !(sender == from && receiver == to));
        for pair in [
            (from.to_string(), to.to_string()),
            (to.to_string(), from.to_string()),
        ] {
            if !state.friendships.contains(&pair) {
                state.friendships.push(pair);
            }
        }
        Ok(())
    }

    async fn remove_friendship(&self, user_id: &str, friend_id: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.friendships.retain(|(a, b)| {
            !((a == user_id && b == friend_id) || (a == friend_id && b == user_id))
        });
        Ok(())
    }
}
