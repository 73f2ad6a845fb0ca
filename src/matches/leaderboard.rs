use crate::matches::stats::aggregate;
use crate::models::common::MatchResult;
use crate::models::football_match::MatchFormat;
use crate::models::football_match::Match;
use crate::models::leaderboard::{LeaderboardEntry, UserStats, UserSummary};

pub const WIN_POINTS: u32 = 3;

/// Goals needed for one bonus point. Small-sided games score more freely.
fn goals_per_bonus_point(format: MatchFormat) -> u32 {
    if format >= MatchFormat::F8 {
        1
    } else {
        2
    }
}

/// Points earned in one match: 3 for a win, plus the format's goal bonus
/// (remainder dropped).
pub fn match_points(format: MatchFormat, result: MatchResult, goals: u32) -> u32 {
    let outcome = match result {
        MatchResult::Win => WIN_POINTS,
        MatchResult::Draw | MatchResult::Loss => 0,
    };
    outcome.saturating_add(goals / goals_per_bonus_point(format))
}

pub fn total_points(stats: &UserStats) -> u32 {
    stats
        .contributions
        .iter()
        .map(|c| match_points(c.format, c.result, c.goals))
        .fold(0u32, u32::saturating_add)
}

/// Descending by points. Equal points keep their incoming order.
pub fn rank(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

pub fn build_leaderboard(
    matches: &[Match],
    users: &[UserSummary],
    year: Option<i32>,
) -> Vec<LeaderboardEntry> {
    let entries = users
        .iter()
        .map(|user| (user, aggregate(matches, &user.user_id, year)))
        .filter(|(_, stats)| stats.matches_played > 0)
        .map(|(user, stats)| LeaderboardEntry {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            matches_played: stats.matches_played,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            goals: stats.goals,
            assists: stats.assists,
            points: total_points(&stats),
        })
        .collect();

    rank(entries)
}
