use std::sync::Arc;

use uuid::Uuid;

use crate::db::{FriendRepository, MatchRepository, UserRepository};
use crate::matches::leaderboard::{build_leaderboard, total_points};
use crate::matches::stats::aggregate;
use crate::matches::validation::{add_player_stats, record_validation, skip_validation};
use crate::matches::MatchError;
use crate::models::football_match::{
    AddPlayerRequest, CreateMatchRequest, Match, MatchFilter, MatchResponse,
};
use crate::models::leaderboard::{LeaderboardEntry, UserStatsResponse, UserSummary};
use crate::models::user::RegisteredUser;
use crate::services::{FriendService, ServiceError, UserService};

const DEFAULT_TEAM: &str = "A";

/// Match lifecycle, stats and leaderboard on top of the repositories
#[derive(Clone)]
pub struct MatchService {
    matches: Arc<dyn MatchRepository>,
    users: UserService,
    friends: FriendService,
}

impl MatchService {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        users: Arc<dyn UserRepository>,
        friends: Arc<dyn FriendRepository>,
    ) -> Self {
        Self {
            matches,
            users: UserService::new(users.clone()),
            friends: FriendService::new(friends, users),
        }
    }

    pub async fn create_match(
        &self,
        caller: &RegisteredUser,
        request: CreateMatchRequest,
    ) -> Result<MatchResponse, ServiceError> {
        let mut details = request.details;
        details.location = details.location.trim().to_string();
        details.time = details.time.trim().to_string();
        if details.location.is_empty() {
            return Err(ServiceError::BadRequest("Location is required".to_string()));
        }
        if details.time.is_empty() {
            return Err(ServiceError::BadRequest("Time is required".to_string()));
        }

        let mut football_match = Match::new(caller.auth_id.clone(), details);
        for line in &request.players {
            add_player_stats(
                &mut football_match,
                &line.user_id,
                &line.team,
                line.goals,
                line.assists,
            )
            .map_err(|e| rejected(&football_match, e))?;
        }

        self.matches.save_match(&football_match).await?;
        tracing::info!(
            "Match {} created by {} with {} players",
            football_match.match_id,
            caller.auth_id,
            football_match.players().len()
        );

        self.respond(&football_match).await
    }

    /// The caller reports their own line, which also counts as their
    /// validation of the match.
    pub async fn add_player(
        &self,
        caller: &RegisteredUser,
        match_id: Uuid,
        request: AddPlayerRequest,
    ) -> Result<MatchResponse, ServiceError> {
        let mut football_match = self.load(match_id).await?;

        let team = request.team.as_deref().unwrap_or(DEFAULT_TEAM);
        add_player_stats(
            &mut football_match,
            &caller.auth_id,
            team,
            request.goals.unwrap_or(0),
            request.assists.unwrap_or(0),
        )
        .map_err(|e| rejected(&football_match, e))?;
        record_validation(&mut football_match, &caller.auth_id)
            .map_err(|e| rejected(&football_match, e))?;

        self.matches.save_match(&football_match).await?;
        tracing::info!("User {} joined match {} on team {}", caller.auth_id, match_id, team);

        self.respond(&football_match).await
    }

    pub async fn validate(&self, caller: &RegisteredUser, match_id: Uuid) -> Result<MatchResponse, ServiceError> {
        let mut football_match = self.load(match_id).await?;
        record_validation(&mut football_match, &caller.auth_id)
            .map_err(|e| rejected(&football_match, e))?;

        self.matches.save_match(&football_match).await?;
        tracing::info!(
            "User {} validated match {} (fully validated: {})",
            caller.auth_id,
            match_id,
            football_match.is_validated()
        );

        self.respond(&football_match).await
    }

    pub async fn skip_validation(
        &self,
        caller: &RegisteredUser,
        match_id: Uuid,
    ) -> Result<MatchResponse, ServiceError> {
        let mut football_match = self.load(match_id).await?;
        skip_validation(&mut football_match, &caller.auth_id)
            .map_err(|e| rejected(&football_match, e))?;

        self.matches.save_match(&football_match).await?;
        tracing::info!("User {} skipped validation of match {}", caller.auth_id, match_id);

        self.respond(&football_match).await
    }

    pub async fn get_match(&self, match_id: Uuid) -> Result<MatchResponse, ServiceError> {
        let football_match = self.load(match_id).await?;
        self.respond(&football_match).await
    }

    pub async fn my_matches(&self, caller: &RegisteredUser) -> Result<Vec<MatchResponse>, ServiceError> {
        let filter = MatchFilter {
            participants: vec![caller.auth_id.clone()],
            or_created_by: Some(caller.auth_id.clone()),
            ..Default::default()
        };
        let matches = self.matches.list_matches(&filter).await?;
        self.respond_all(&matches).await
    }

    /// Matches the caller plays in and has neither confirmed nor skipped.
    pub async fn pending_validation(
        &self,
        caller: &RegisteredUser,
    ) -> Result<Vec<MatchResponse>, ServiceError> {
        let filter = MatchFilter {
            participants: vec![caller.auth_id.clone()],
            ..Default::default()
        };
        let pending: Vec<Match> = self
            .matches
            .list_matches(&filter)
            .await?
            .into_iter()
            .filter(|m| !m.has_validated(&caller.auth_id))
            .collect();
        self.respond_all(&pending).await
    }

    pub async fn user_stats(
        &self,
        caller: &RegisteredUser,
        year: Option<i32>,
    ) -> Result<UserStatsResponse, ServiceError> {
        let filter = MatchFilter {
            participants: vec![caller.auth_id.clone()],
            validated_only: true,
            year,
            ..Default::default()
        };
        let matches = self.matches.list_matches(&filter).await?;
        let stats = aggregate(&matches, &caller.auth_id, year);
        let points = total_points(&stats);

        Ok(UserStatsResponse { stats, points })
    }

    /// Ranking of the caller and their friends.
    pub async fn leaderboard(
        &self,
        caller: &RegisteredUser,
        year: Option<i32>,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let mut ids = vec![caller.auth_id.clone()];
        ids.extend(self.friends.friend_ids(&caller.auth_id).await?);

        let users: Vec<UserSummary> = self
            .users
            .registered_users(&ids)
            .await?
            .into_iter()
            .map(|user| UserSummary {
                user_id: user.auth_id,
                username: user.username,
            })
            .collect();

        let filter = MatchFilter {
            participants: ids,
            validated_only: true,
            year,
            ..Default::default()
        };
        let matches = self.matches.list_matches(&filter).await?;
        let entries = build_leaderboard(&matches, &users, year);
        tracing::debug!(
            "Leaderboard for {} over {} matches has {} entries",
            caller.auth_id,
            matches.len(),
            entries.len()
        );

        Ok(entries)
    }

    async fn load(&self, match_id: Uuid) -> Result<Match, ServiceError> {
        self.matches
            .get_match(match_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Match not found".to_string()))
    }

    async fn respond(&self, football_match: &Match) -> Result<MatchResponse, ServiceError> {
        let mut responses = self.respond_all(std::slice::from_ref(football_match)).await?;
        responses
            .pop()
            .ok_or_else(|| ServiceError::NotFound("Match not found".to_string()))
    }

    async fn respond_all(&self, matches: &[Match]) -> Result<Vec<MatchResponse>, ServiceError> {
        let mut ids: Vec<String> = Vec::new();
        for football_match in matches {
            ids.push(football_match.created_by.clone());
            ids.extend(football_match.players().iter().map(|p| p.user_id.clone()));
        }
        ids.sort();
        ids.dedup();

        let usernames = self.users.usernames(&ids).await?;
        Ok(matches
            .iter()
            .map(|m| MatchResponse::from_match(m, &usernames))
            .collect())
    }
}

fn rejected(football_match: &Match, error: MatchError) -> ServiceError {
    tracing::warn!("Match {} rejected operation: {}", football_match.match_id, error);
    ServiceError::Match(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::football_match::{MatchDetails, MatchFormat, PlayerStatsInput};
    use crate::models::user::User;
    use chrono::{NaiveDate, Utc};

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: MatchService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryStore::default());
            let service = MatchService::new(store.clone(), store.clone(), store.clone());
            Self { store, service }
        }

        async fn user(&self, auth_id: &str) -> RegisteredUser {
            let user = User {
                auth_id: auth_id.to_string(),
                username: Some(format!("{}_name", auth_id)),
                email: format!("{}@example.com", auth_id),
                created_at: Utc::now(),
            };
            UserRepository::save_user(self.store.as_ref(), &user).await.unwrap();
            RegisteredUser::try_from(user).unwrap()
        }
    }

    fn request(date: (i32, u32, u32), lines: &[(&str, &str, i64)]) -> CreateMatchRequest {
        CreateMatchRequest {
            details: MatchDetails {
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                time: "19:30".to_string(),
                location: "Park".to_string(),
                format: MatchFormat::F5,
            },
            players: lines
                .iter()
                .map(|(user_id, team, goals)| PlayerStatsInput {
                    user_id: user_id.to_string(),
                    team: team.to_string(),
                    goals: *goals,
                    assists: 0,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_then_validate_until_complete() {
        let fx = Fixture::new();
        let u1 = fx.user("u1").await;
        let u2 = fx.user("u2").await;

        let created = fx
            .service
            .create_match(&u1, request((2024, 5, 1), &[("u1", "A", 2), ("u2", "B", 1)]))
            .await
            .unwrap();
        assert_eq!(created.score.team_a, 2);
        assert_eq!(created.players[1].username, "u2_name");
        assert!(!created.is_validated);

        let pending = fx.service.pending_validation(&u2).await.unwrap();
        assert_eq!(pending.len(), 1);

        fx.service.validate(&u1, created.match_id).await.unwrap();
        let done = fx.service.skip_validation(&u2, created.match_id).await.unwrap();
        assert!(done.is_validated);
        assert!(fx.service.pending_validation(&u2).await.unwrap().is_empty());

        let again = fx.service.validate(&u1, created.match_id).await;
        assert!(matches!(
            again,
            Err(ServiceError::Match(MatchError::AlreadyValidated(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_lines_without_saving() {
        let fx = Fixture::new();
        let u1 = fx.user("u1").await;

        let duplicate = fx
            .service
            .create_match(&u1, request((2024, 5, 1), &[("u1", "A", 0), ("u1", "B", 0)]))
            .await;
        assert!(matches!(
            duplicate,
            Err(ServiceError::Match(MatchError::DuplicatePlayer(_)))
        ));

        let negative = fx
            .service
            .create_match(&u1, request((2024, 5, 1), &[("u1", "A", -1)]))
            .await;
        assert!(matches!(
            negative,
            Err(ServiceError::Match(MatchError::NegativeStat { .. }))
        ));

        assert!(fx.service.my_matches(&u1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_player_records_the_callers_validation() {
        let fx = Fixture::new();
        let u1 = fx.user("u1").await;
        let u2 = fx.user("u2").await;

        let created = fx
            .service
            .create_match(&u1, request((2024, 5, 1), &[("u1", "A", 1)]))
            .await
            .unwrap();
        let joined = fx
            .service
            .add_player(&u2, created.match_id, AddPlayerRequest::default())
            .await
            .unwrap();

        assert_eq!(joined.players.len(), 2);
        assert_eq!(joined.players[1].goals, 0);
        assert!(joined.validations.iter().any(|v| v.user_id == "u2"));
        assert!(!joined.is_validated);

        let outsider = fx.user("u3").await;
        let rejected = fx.service.validate(&outsider, created.match_id).await;
        assert!(matches!(
            rejected,
            Err(ServiceError::Match(MatchError::NotAParticipant(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_found() {
        let fx = Fixture::new();
        let result = fx.service.get_match(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
