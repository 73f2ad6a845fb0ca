// src/models/leaderboard.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::common::MatchResult;
use crate::models::football_match::MatchFormat;

/// A single match as it counts for one player
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MatchContribution {
    pub match_id: Uuid,
    pub format: MatchFormat,
    pub result: MatchResult,
    pub goals: u32,
    pub assists: u32,
}

/// Totals for one user over the validated matches of a year
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    pub user_id: String,
    pub year: Option<i32>,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals: u32,
    pub assists: u32,
    pub by_format: BTreeMap<MatchFormat, u32>,
    #[serde(skip)]
    pub contributions: Vec<MatchContribution>,
}

/// Ranked row of the leaderboard, derived and never persisted
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
}

/// Player stats plus points, as returned by the stats endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserStatsResponse {
    #[serde(flatten)]
    pub stats: UserStats,
    pub points: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Who can appear on a leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
}
