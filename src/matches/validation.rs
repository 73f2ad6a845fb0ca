use chrono::{DateTime, Utc};

use crate::matches::error::MatchError;
use crate::models::football_match::{Match, MatchValidation, PlayerStats, Team};

/// Upper bound for a single player's goals or assists in one match
pub const MAX_STAT_PER_MATCH: u32 = 999;

/// Record a participant's confirmation of the match.
pub fn record_validation(football_match: &mut Match, user_id: &str) -> Result<(), MatchError> {
    append_validation(football_match, user_id, false, Utc::now())
}

/// Record an explicit waiver for a participant. Counts toward completion
/// exactly like a confirmation; the entry keeps the `skipped` flag.
pub fn skip_validation(football_match: &mut Match, user_id: &str) -> Result<(), MatchError> {
    append_validation(football_match, user_id, true, Utc::now())
}

fn append_validation(
    football_match: &mut Match,
    user_id: &str,
    skipped: bool,
    timestamp: DateTime<Utc>,
) -> Result<(), MatchError> {
    if !football_match.is_participant(user_id) {
        return Err(MatchError::NotAParticipant(user_id.to_string()));
    }
    if football_match.has_validated(user_id) {
        return Err(MatchError::AlreadyValidated(user_id.to_string()));
    }

    football_match.validations.push(MatchValidation {
        user_id: user_id.to_string(),
        timestamp,
        skipped,
    });
    football_match.refresh_derived();
    Ok(())
}

/// Every distinct player has a validation entry, skipped or confirmed.
/// A match without players is vacuously validated.
pub fn is_fully_validated(football_match: &Match) -> bool {
    football_match
        .players
        .iter()
        .all(|player| football_match.has_validated(&player.user_id))
}

/// Append a player's line and recompute the score. Every input is checked
/// before the match is touched.
pub fn add_player_stats(
    football_match: &mut Match,
    user_id: &str,
    team: &str,
    goals: i64,
    assists: i64,
) -> Result<(), MatchError> {
    if football_match.is_participant(user_id) {
        return Err(MatchError::DuplicatePlayer(user_id.to_string()));
    }
    let team: Team = team.parse()?;
    let goals = bounded_stat("goals", goals)?;
    let assists = bounded_stat("assists", assists)?;

    let team_goals = football_match.score().goals_for(team);
    if team_goals.checked_add(goals).is_none() {
        return Err(MatchError::StatTooLarge {
            field: "goals",
            value: i64::from(goals),
            max: u32::MAX - team_goals,
        });
    }

    football_match.players.push(PlayerStats {
        user_id: user_id.to_string(),
        team,
        goals,
        assists,
    });
    football_match.refresh_derived();
    Ok(())
}

fn bounded_stat(field: &'static str, value: i64) -> Result<u32, MatchError> {
    if value < 0 {
        return Err(MatchError::NegativeStat { field, value });
    }
    match u32::try_from(value) {
        Ok(stat) if stat <= MAX_STAT_PER_MATCH => Ok(stat),
        _ => Err(MatchError::StatTooLarge {
            field,
            value,
            max: MAX_STAT_PER_MATCH,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::football_match::{MatchDetails, MatchFormat, Score};
    use chrono::NaiveDate;

    fn new_match(format: MatchFormat) -> Match {
        Match::new(
            "creator",
            MatchDetails {
                date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                time: "19:00".to_string(),
                location: "Sports hall".to_string(),
                format,
            },
        )
    }

    #[test]
    fn test_validation_requires_participation() {
        let mut m = new_match(MatchFormat::F5);
        add_player_stats(&mut m, "u1", "A", 1, 0).unwrap();

        let err = record_validation(&mut m, "stranger").unwrap_err();
        assert_eq!(err, MatchError::NotAParticipant("stranger".to_string()));
        let err = skip_validation(&mut m, "stranger").unwrap_err();
        assert_eq!(err, MatchError::NotAParticipant("stranger".to_string()));
        assert!(m.validations().is_empty());
    }

    #[test]
    fn test_second_validation_is_rejected() {
        let mut m = new_match(MatchFormat::F5);
        add_player_stats(&mut m, "u1", "A", 0, 0).unwrap();
        add_player_stats(&mut m, "u2", "B", 0, 0).unwrap();

        record_validation(&mut m, "u1").unwrap();
        assert_eq!(
            record_validation(&mut m, "u1"),
            Err(MatchError::AlreadyValidated("u1".to_string()))
        );
        assert_eq!(
            skip_validation(&mut m, "u1"),
            Err(MatchError::AlreadyValidated("u1".to_string()))
        );
        assert_eq!(m.validations().len(), 1);
        assert!(!m.is_validated());
    }

    #[test]
    fn test_fully_validated_once_every_player_confirms_or_skips() {
        let mut m = new_match(MatchFormat::F6);
        add_player_stats(&mut m, "u1", "A", 0, 0).unwrap();
        add_player_stats(&mut m, "u2", "B", 0, 0).unwrap();
        add_player_stats(&mut m, "u3", "B", 0, 0).unwrap();

        record_validation(&mut m, "u1").unwrap();
        assert!(!m.is_validated());
        skip_validation(&mut m, "u2").unwrap();
        assert!(!m.is_validated());
        record_validation(&mut m, "u3").unwrap();
        assert!(m.is_validated());
        assert!(m.validations().iter().any(|v| v.user_id == "u2" && v.skipped));
    }

    #[test]
    fn test_new_player_reopens_validation() {
        let mut m = new_match(MatchFormat::F5);
        add_player_stats(&mut m, "u1", "A", 0, 0).unwrap();
        record_validation(&mut m, "u1").unwrap();
        assert!(m.is_validated());

        add_player_stats(&mut m, "u2", "B", 0, 0).unwrap();
        assert!(!m.is_validated());
    }

    #[test]
    fn test_match_without_players_is_vacuously_validated() {
        let m = new_match(MatchFormat::F5);
        assert!(is_fully_validated(&m));
    }

    #[test]
    fn test_add_player_stats_rejections() {
        let mut m = new_match(MatchFormat::F9);
        add_player_stats(&mut m, "u1", "A", 2, 1).unwrap();

        assert_eq!(
            add_player_stats(&mut m, "u1", "B", 0, 0),
            Err(MatchError::DuplicatePlayer("u1".to_string()))
        );
        assert_eq!(
            add_player_stats(&mut m, "u2", "C", 0, 0),
            Err(MatchError::InvalidTeam("C".to_string()))
        );
        assert_eq!(
            add_player_stats(&mut m, "u2", "A", -1, 0),
            Err(MatchError::NegativeStat { field: "goals", value: -1 })
        );
        assert_eq!(
            add_player_stats(&mut m, "u2", "A", 0, -3),
            Err(MatchError::NegativeStat { field: "assists", value: -3 })
        );
        assert_eq!(m.players().len(), 1);
        assert_eq!(m.score(), Score { team_a: 2, team_b: 0 });
    }

    #[test]
    fn test_oversized_stats_are_rejected_without_touching_the_match() {
        let mut m = new_match(MatchFormat::F5);
        add_player_stats(&mut m, "u1", "A", MAX_STAT_PER_MATCH as i64, 0).unwrap();

        assert_eq!(
            add_player_stats(&mut m, "u2", "A", 3_000_000_000, 0),
            Err(MatchError::StatTooLarge {
                field: "goals",
                value: 3_000_000_000,
                max: MAX_STAT_PER_MATCH,
            })
        );
        assert_eq!(
            add_player_stats(&mut m, "u3", "B", 5_000_000_000, 0),
            Err(MatchError::StatTooLarge {
                field: "goals",
                value: 5_000_000_000,
                max: MAX_STAT_PER_MATCH,
            })
        );
        assert_eq!(
            add_player_stats(&mut m, "u4", "B", 0, 1000),
            Err(MatchError::StatTooLarge {
                field: "assists",
                value: 1000,
                max: MAX_STAT_PER_MATCH,
            })
        );
        assert_eq!(
            add_player_stats(&mut m, "u5", "B", -1, 5_000_000_000),
            Err(MatchError::NegativeStat { field: "goals", value: -1 })
        );

        assert_eq!(m.players().len(), 1);
        assert_eq!(m.score(), Score { team_a: MAX_STAT_PER_MATCH, team_b: 0 });
    }

    #[test]
    fn test_team_total_never_overflows() {
        let mut m = new_match(MatchFormat::F11);
        m.players.push(PlayerStats {
            user_id: "restored".to_string(),
            team: Team::A,
            goals: u32::MAX - 10,
            assists: 0,
        });
        m.refresh_derived();

        assert_eq!(
            add_player_stats(&mut m, "u1", "A", 11, 0),
            Err(MatchError::StatTooLarge {
                field: "goals",
                value: 11,
                max: 10,
            })
        );
        add_player_stats(&mut m, "u1", "A", 10, 0).unwrap();
        assert_eq!(m.score().team_a, u32::MAX);
        assert_eq!(m.players().len(), 2);
    }

    #[test]
    fn test_score_tracks_every_successful_add() {
        let mut m = new_match(MatchFormat::F7);
        add_player_stats(&mut m, "u1", "A", 2, 0).unwrap();
        add_player_stats(&mut m, "u2", "B", 1, 1).unwrap();
        assert_eq!(m.score(), Score { team_a: 2, team_b: 1 });
        add_player_stats(&mut m, "u3", "B", 4, 0).unwrap();
        assert_eq!(m.score(), Score { team_a: 2, team_b: 5 });
    }
}
