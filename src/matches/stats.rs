use chrono::Datelike;

use crate::models::common::MatchResult;
use crate::models::football_match::Match;
use crate::models::leaderboard::{MatchContribution, UserStats};

/// Whether a match counts toward a user's totals for the given year.
/// `None` means every year.
pub fn qualifies(football_match: &Match, user_id: &str, year: Option<i32>) -> bool {
    football_match.is_validated()
        && football_match.is_participant(user_id)
        && year.map_or(true, |year| football_match.details.date.year() == year)
}

/// Fold the qualifying matches into the user's totals.
pub fn aggregate(matches: &[Match], user_id: &str, year: Option<i32>) -> UserStats {
    let mut stats = UserStats {
        user_id: user_id.to_string(),
        year,
        ..Default::default()
    };

    for football_match in matches.iter().filter(|m| qualifies(m, user_id, year)) {
        let Some(player) = football_match.player(user_id) else {
            continue;
        };
        let result = football_match.score().result_for(player.team);

        stats.matches_played = stats.matches_played.saturating_add(1);
        match result {
            MatchResult::Win => stats.wins = stats.wins.saturating_add(1),
            MatchResult::Draw => stats.draws = stats.draws.saturating_add(1),
            MatchResult::Loss => stats.losses = stats.losses.saturating_add(1),
        }
        stats.goals = stats.goals.saturating_add(player.goals);
        stats.assists = stats.assists.saturating_add(player.assists);
        let played = stats.by_format.entry(football_match.details.format).or_insert(0);
        *played = played.saturating_add(1);
        stats.contributions.push(MatchContribution {
            match_id: football_match.match_id,
            format: football_match.details.format,
            result,
            goals: player.goals,
            assists: player.assists,
        });
    }

    stats
}
