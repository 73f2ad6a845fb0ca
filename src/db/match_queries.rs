use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::db::{MatchRepository, RepositoryError};
use crate::models::football_match::{
    Match, MatchDetails, MatchFilter, MatchFormat, MatchValidation, PlayerStats, Team,
};

#[derive(Debug, FromRow)]
struct MatchRow {
    match_id: Uuid,
    created_by: String,
    match_date: NaiveDate,
    kick_off: String,
    location: String,
    format: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PlayerRow {
    match_id: Uuid,
    user_id: String,
    team: String,
    goals: i64,
    assists: i64,
}

#[derive(Debug, FromRow)]
struct ValidationRow {
    match_id: Uuid,
    user_id: String,
    skipped: bool,
    validated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_matches(&self, rows: Vec<MatchRow>) -> Result<Vec<Match>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.match_id).collect();

        let player_rows = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT match_id, user_id, team, goals, assists
            FROM match_players
            WHERE match_id = ANY($1)
            ORDER BY match_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let validation_rows = sqlx::query_as::<_, ValidationRow>(
            r#"
            SELECT match_id, user_id, skipped, validated_at
            FROM match_validations
            WHERE match_id = ANY($1)
            ORDER BY match_id, validated_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut players: HashMap<Uuid, Vec<PlayerStats>> = HashMap::new();
        for row in player_rows {
            players.entry(row.match_id).or_default().push(PlayerStats {
                team: row.team.parse::<Team>().map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
                goals: stat_from_column("goals", row.goals)?,
                assists: stat_from_column("assists", row.assists)?,
                user_id: row.user_id,
            });
        }

        let mut validations: HashMap<Uuid, Vec<MatchValidation>> = HashMap::new();
        for row in validation_rows {
            validations.entry(row.match_id).or_default().push(MatchValidation {
                user_id: row.user_id,
                timestamp: row.validated_at,
                skipped: row.skipped,
            });
        }

        rows.into_iter()
            .map(|row| {
                let format = row
                    .format
                    .parse::<MatchFormat>()
                    .map_err(RepositoryError::Corrupt)?;
                Ok(Match::restore(
                    row.match_id,
                    row.created_by,
                    MatchDetails {
                        date: row.match_date,
                        time: row.kick_off,
                        location: row.location,
                        format,
                    },
                    row.created_at,
                    players.remove(&row.match_id).unwrap_or_default(),
                    validations.remove(&row.match_id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}

fn stat_from_column(field: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Corrupt(format!("{} out of range: {}", field, value)))
}

const MATCH_COLUMNS: &str =
    "SELECT m.match_id, m.created_by, m.match_date, m.kick_off, m.location, m.format, m.created_at FROM matches m WHERE TRUE";

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(MATCH_COLUMNS);

        if !filter.participants.is_empty() || filter.or_created_by.is_some() {
            query.push(" AND (FALSE");
            if !filter.participants.is_empty() {
                query.push(
                    " OR EXISTS (SELECT 1 FROM match_players p WHERE p.match_id = m.match_id AND p.user_id = ANY(",
                );
                query.push_bind(filter.participants.clone());
                query.push("))");
            }
            if let Some(user_id) = &filter.or_created_by {
                query.push(" OR m.created_by = ");
                query.push_bind(user_id.clone());
            }
            query.push(")");
        }

        if let Some(year) = filter.year {
            let bounds = NaiveDate::from_ymd_opt(year, 1, 1)
                .zip(NaiveDate::from_ymd_opt(year + 1, 1, 1));
            let Some((start, end)) = bounds else {
                return Ok(Vec::new());
            };
            query.push(" AND m.match_date >= ");
            query.push_bind(start);
            query.push(" AND m.match_date < ");
            query.push_bind(end);
        }

        query.push(" ORDER BY m.match_date DESC, m.created_at DESC");

        let rows = query
            .build_query_as::<MatchRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!("Loaded {} match rows for filter {:?}", rows.len(), filter);

        // Validation is judged on the rebuilt match, never on the stored flag
        Ok(self
            .load_matches(rows)
            .await?
            .into_iter()
            .filter(|m| filter.accepts(m))
            .collect())
    }

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError> {
        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT match_id, created_by, match_date, kick_off, location, format, created_at
            FROM matches
            WHERE match_id = $1
            "#,
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.load_matches(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save_match(&self, football_match: &Match) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let score = football_match.score();

        sqlx::query(
            r#"
            INSERT INTO matches (
                match_id, created_by, match_date, kick_off, location, format,
                score_team_a, score_team_b, is_validated, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (match_id) DO UPDATE SET
                score_team_a = EXCLUDED.score_team_a,
                score_team_b = EXCLUDED.score_team_b,
                is_validated = EXCLUDED.is_validated
            "#,
        )
        .bind(football_match.match_id)
        .bind(&football_match.created_by)
        .bind(football_match.details.date)
        .bind(&football_match.details.time)
        .bind(&football_match.details.location)
        .bind(football_match.details.format.as_str())
        .bind(i64::from(score.team_a))
        .bind(i64::from(score.team_b))
        .bind(football_match.is_validated())
        .bind(football_match.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert match {}: {:?}", football_match.match_id, e);
            e
        })?;

        for (position, player) in football_match.players().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO match_players (match_id, user_id, team, goals, assists, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (match_id, user_id) DO NOTHING
                "#,
            )
            .bind(football_match.match_id)
            .bind(&player.user_id)
            .bind(player.team.as_str())
            .bind(i64::from(player.goals))
            .bind(i64::from(player.assists))
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        for validation in football_match.validations() {
            sqlx::query(
                r#"
                INSERT INTO match_validations (match_id, user_id, skipped, validated_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (match_id, user_id) DO NOTHING
                "#,
            )
            .bind(football_match.match_id)
            .bind(&validation.user_id)
            .bind(validation.skipped)
            .bind(validation.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        // Refresh the stored summary from every row committed so far, not just this copy's
        sqlx::query(
            r#"
            UPDATE matches m SET
                score_team_a = COALESCE(
                    (SELECT SUM(p.goals) FROM match_players p WHERE p.match_id = m.match_id AND p.team = 'A'), 0),
                score_team_b = COALESCE(
                    (SELECT SUM(p.goals) FROM match_players p WHERE p.match_id = m.match_id AND p.team = 'B'), 0),
                is_validated = NOT EXISTS (
                    SELECT 1 FROM match_players p
                    WHERE p.match_id = m.match_id
                      AND NOT EXISTS (
                          SELECT 1 FROM match_validations v
                          WHERE v.match_id = p.match_id AND v.user_id = p.user_id
                      )
                )
            WHERE m.match_id = $1
            "#,
        )
        .bind(football_match.match_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
