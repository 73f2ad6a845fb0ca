// src/models/football_match.rs
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matches::error::MatchError;
use crate::models::common::MatchResult;

/// Side a player lined up on
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }
}

impl FromStr for Team {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Team::A),
            "B" => Ok(Team::B),
            other => Err(MatchError::InvalidTeam(other.to_string())),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of players per side. Fixes the goal bonus used on the leaderboard.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchFormat {
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 7] = [
        MatchFormat::F5,
        MatchFormat::F6,
        MatchFormat::F7,
        MatchFormat::F8,
        MatchFormat::F9,
        MatchFormat::F10,
        MatchFormat::F11,
    ];

    pub fn players_per_side(&self) -> u8 {
        match self {
            MatchFormat::F5 => 5,
            MatchFormat::F6 => 6,
            MatchFormat::F7 => 7,
            MatchFormat::F8 => 8,
            MatchFormat::F9 => 9,
            MatchFormat::F10 => 10,
            MatchFormat::F11 => 11,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFormat::F5 => "F5",
            MatchFormat::F6 => "F6",
            MatchFormat::F7 => "F7",
            MatchFormat::F8 => "F8",
            MatchFormat::F9 => "F9",
            MatchFormat::F10 => "F10",
            MatchFormat::F11 => "F11",
        }
    }
}

impl FromStr for MatchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| format!("{} is not a supported match format", s))
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One participant's line in a match
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerStats {
    pub user_id: String,
    pub team: Team,
    pub goals: u32,
    pub assists: u32,
}

/// Goals per team, always the sum of the players' goals
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    #[serde(rename = "teamA")]
    pub team_a: u32,
    #[serde(rename = "teamB")]
    pub team_b: u32,
}

impl Score {
    pub fn from_players(players: &[PlayerStats]) -> Self {
        players.iter().fold(Score::default(), |mut score, player| {
            match player.team {
                Team::A => score.team_a = score.team_a.saturating_add(player.goals),
                Team::B => score.team_b = score.team_b.saturating_add(player.goals),
            }
            score
        })
    }

    pub fn goals_for(&self, team: Team) -> u32 {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    pub fn result_for(&self, team: Team) -> MatchResult {
        let result = MatchResult::from_scores(self.team_a, self.team_b);
        match team {
            Team::A => result,
            Team::B => result.inverse(),
        }
    }
}

/// A participant's confirmation (or explicit waiver) of the recorded match
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MatchValidation {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub skipped: bool,
}

/// Descriptive fields fixed at creation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MatchDetails {
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub format: MatchFormat,
}

/// A recorded game. `score` and `is_validated` are derived from the players
/// and validations and are recomputed on every mutation.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Match {
    pub match_id: Uuid,
    pub created_by: String,
    #[serde(flatten)]
    pub details: MatchDetails,
    pub(crate) players: Vec<PlayerStats>,
    pub(crate) score: Score,
    pub(crate) validations: Vec<MatchValidation>,
    pub(crate) is_validated: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// A fresh match with no players and no validations.
    pub fn new(created_by: impl Into<String>, details: MatchDetails) -> Self {
        let mut football_match = Self {
            match_id: Uuid::new_v4(),
            created_by: created_by.into(),
            details,
            players: Vec::new(),
            score: Score::default(),
            validations: Vec::new(),
            is_validated: false,
            created_at: Utc::now(),
        };
        football_match.refresh_derived();
        football_match
    }

    /// Rebuild a match from stored parts, recomputing the derived fields.
    pub fn restore(
        match_id: Uuid,
        created_by: String,
        details: MatchDetails,
        created_at: DateTime<Utc>,
        players: Vec<PlayerStats>,
        validations: Vec<MatchValidation>,
    ) -> Self {
        let mut football_match = Self {
            match_id,
            created_by,
            details,
            players,
            score: Score::default(),
            validations,
            is_validated: false,
            created_at,
        };
        football_match.refresh_derived();
        football_match
    }

    pub fn players(&self) -> &[PlayerStats] {
        &self.players
    }

    pub fn validations(&self) -> &[MatchValidation] {
        &self.validations
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn is_validated(&self) -> bool {
        self.is_validated
    }

    pub fn player(&self, user_id: &str) -> Option<&PlayerStats> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.player(user_id).is_some()
    }

    /// True when the user has a validation entry, skipped or not.
    pub fn has_validated(&self, user_id: &str) -> bool {
        self.validations.iter().any(|v| v.user_id == user_id)
    }

    pub(crate) fn refresh_derived(&mut self) {
        self.score = Score::from_players(&self.players);
        self.is_validated = crate::matches::validation::is_fully_validated(self);
    }
}

/// Raw player line as submitted by a client. Kept loose so the domain can
/// reject bad teams and negative values with its own error kinds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerStatsInput {
    pub user_id: String,
    pub team: String,
    #[serde(default)]
    pub goals: i64,
    #[serde(default)]
    pub assists: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateMatchRequest {
    #[serde(flatten)]
    pub details: MatchDetails,
    #[serde(default)]
    pub players: Vec<PlayerStatsInput>,
}

/// Self-reported stats for the caller joining an existing match
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AddPlayerRequest {
    pub team: Option<String>,
    pub goals: Option<i64>,
    pub assists: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerView {
    pub user_id: String,
    pub username: String,
    pub team: Team,
    pub goals: u32,
    pub assists: u32,
}

/// Match as returned to clients, with usernames resolved
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchResponse {
    pub match_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub format: MatchFormat,
    pub created_by: String,
    pub creator_username: String,
    pub players: Vec<PlayerView>,
    pub score: Score,
    pub validations: Vec<MatchValidation>,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
}

pub const UNKNOWN_USERNAME: &str = "Unknown";

impl MatchResponse {
    pub fn from_match(football_match: &Match, usernames: &HashMap<String, String>) -> Self {
        let username_of = |user_id: &str| {
            usernames
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string())
        };

        Self {
            match_id: football_match.match_id,
            date: football_match.details.date,
            time: football_match.details.time.clone(),
            location: football_match.details.location.clone(),
            format: football_match.details.format,
            created_by: football_match.created_by.clone(),
            creator_username: username_of(&football_match.created_by),
            players: football_match
                .players
                .iter()
                .map(|p| PlayerView {
                    user_id: p.user_id.clone(),
                    username: username_of(&p.user_id),
                    team: p.team,
                    goals: p.goals,
                    assists: p.assists,
                })
                .collect(),
            score: football_match.score,
            validations: football_match.validations.clone(),
            is_validated: football_match.is_validated,
            created_at: football_match.created_at,
        }
    }
}

/// Selection passed to the match repository
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    /// Only matches where at least one of these users is listed among the players
    pub participants: Vec<String>,
    /// Matches created by this user are included even without participation
    pub or_created_by: Option<String>,
    pub validated_only: bool,
    pub year: Option<i32>,
}

impl MatchFilter {
    pub fn accepts(&self, football_match: &Match) -> bool {
        use chrono::Datelike;

        let involved = if self.participants.is_empty() && self.or_created_by.is_none() {
            true
        } else {
            self.participants
                .iter()
                .any(|user_id| football_match.is_participant(user_id))
                || self
                    .or_created_by
                    .as_deref()
                    .is_some_and(|user_id| football_match.created_by == user_id)
        };

        involved
            && (!self.validated_only || football_match.is_validated)
            && self
                .year
                .map_or(true, |year| football_match.details.date.year() == year)
    }
}
