use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::{MatchModel, MatchStatus, NewMatch};
use crate::shared::AppError;

const SERIALIZATION_FAILURE: &str = "40001";

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// All matches of a tournament ordered by round, then position
    async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<MatchModel>, AppError>;

    /// Stores a batch atomically and assigns ids.
    /// A (tournament, round, position) that already exists fails the whole batch with `Conflict`.
    async fn save_batch(&self, matches: &[NewMatch]) -> Result<Vec<MatchModel>, AppError>;

    /// Marks a match completed with the given winner
    async fn record_result(&self, match_id: Uuid, winner: Uuid) -> Result<MatchModel, AppError>;
}

/// In-memory implementation of MatchRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<MatchModel>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches across all tournaments
    pub async fn match_count(&self) -> usize {
        self.matches.read().await.len()
    }
}

fn check_result(stored: &MatchModel, winner: Uuid) -> Result<(), AppError> {
    if stored.is_completed() {
        return Err(AppError::Conflict(format!(
            "Match {} already completed",
            stored.id
        )));
    }
    if !stored.involves(winner) {
        return Err(AppError::Conflict(format!(
            "Winner {} is not a side of match {}",
            winner, stored.id
        )));
    }
    Ok(())
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self))]
    async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<MatchModel>, AppError> {
        let matches = self.matches.read().await;
        let mut found: Vec<MatchModel> = matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.round, m.position));
        Ok(found)
    }

    #[instrument(skip(self, matches), fields(batch_size = matches.len()))]
    async fn save_batch(&self, matches: &[NewMatch]) -> Result<Vec<MatchModel>, AppError> {
        let mut stored = self.matches.write().await;

        for new_match in matches {
            let taken = stored.iter().any(|m| {
                m.tournament_id == new_match.tournament_id
                    && m.round == new_match.round
                    && m.position == new_match.position
            });
            if taken {
                warn!(
                    tournament_id = %new_match.tournament_id,
                    round = new_match.round,
                    position = new_match.position,
                    "Match slot already taken"
                );
                return Err(AppError::Conflict(format!(
                    "Round {} position {} already exists",
                    new_match.round, new_match.position
                )));
            }
        }

        let saved: Vec<MatchModel> = matches
            .iter()
            .cloned()
            .map(|m| m.into_model(Uuid::new_v4()))
            .collect();
        stored.extend(saved.iter().cloned());

        debug!(saved = saved.len(), "Match batch stored in memory");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn record_result(&self, match_id: Uuid, winner: Uuid) -> Result<MatchModel, AppError> {
        let mut stored = self.matches.write().await;
        let found = stored
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| AppError::NotFound(format!("Match {}", match_id)))?;

        check_result(found, winner)?;

        found.status = MatchStatus::Completed;
        found.winner = Some(winner);
        info!(match_id = %match_id, winner = %winner, round = found.round, "Match result recorded");
        Ok(found.clone())
    }
}

/// PostgreSQL implementation of match repository
pub struct PostgresMatchRepository {
    pool: PgPool,
    max_retries: u32,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool, max_retries: u32) -> Self {
        Self { pool, max_retries }
    }

    async fn insert_batch(&self, matches: &[NewMatch]) -> Result<Vec<MatchModel>, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(matches.len());
        for new_match in matches {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO matches (id, tournament_id, round, position, side_a, side_b, group_index, status, winner, scheduled_start) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
            )
            .bind(id)
            .bind(new_match.tournament_id)
            .bind(new_match.round as i32)
            .bind(new_match.position as i32)
            .bind(new_match.side_a)
            .bind(new_match.side_b)
            .bind(new_match.group.map(|g| g as i32))
            .bind(new_match.status.to_string())
            .bind(new_match.winner)
            .bind(new_match.scheduled_start)
            .execute(&mut *tx)
            .await?;
            saved.push(new_match.clone().into_model(id));
        }

        tx.commit().await?;
        Ok(saved)
    }
}

fn row_to_match(row: PgRow) -> Result<MatchModel, AppError> {
    let status: String = row.get("status");
    let round: i32 = row.get("round");
    let position: i32 = row.get("position");
    let group: Option<i32> = row.get("group_index");

    Ok(MatchModel {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        round: round.max(0) as u32,
        position: position.max(0) as u32,
        side_a: row.get("side_a"),
        side_b: row.get("side_b"),
        group: group.map(|g| g.max(0) as u32),
        status: MatchStatus::from_str(&status)
            .map_err(|e| AppError::DatabaseError(format!("Invalid match status: {}", e)))?,
        winner: row.get("winner"),
        scheduled_start: row.get("scheduled_start"),
    })
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    #[instrument(skip(self))]
    async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<MatchModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, tournament_id, round, position, side_a, side_b, group_index, status, winner, scheduled_start FROM matches WHERE tournament_id = $1 ORDER BY round, position"
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, tournament_id = %tournament_id, "Failed to list matches");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(row_to_match).collect()
    }

    #[instrument(skip(self, matches), fields(batch_size = matches.len()))]
    async fn save_batch(&self, matches: &[NewMatch]) -> Result<Vec<MatchModel>, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.insert_batch(matches).await {
                Ok(saved) => return Ok(saved),
                Err(e) => {
                    let code = e
                        .as_database_error()
                        .and_then(|db| db.code())
                        .map(|c| c.into_owned());
                    let unique = e
                        .as_database_error()
                        .is_some_and(|db| db.is_unique_violation());

                    if unique {
                        return Err(AppError::Conflict(
                            "Match slot already exists".to_string(),
                        ));
                    }
                    if code.as_deref() == Some(SERIALIZATION_FAILURE) {
                        if attempt <= self.max_retries {
                            debug!(attempt, "Serialization failure saving matches, retrying");
                            continue;
                        }
                        warn!(attempt, "Serialization retries exhausted");
                        return Err(AppError::Transient(e.to_string()));
                    }

                    warn!(error = %e, "Failed to save match batch");
                    return Err(AppError::DatabaseError(e.to_string()));
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn record_result(&self, match_id: Uuid, winner: Uuid) -> Result<MatchModel, AppError> {
        let row = sqlx::query(
            "SELECT id, tournament_id, round, position, side_a, side_b, group_index, status, winner, scheduled_start FROM matches WHERE id = $1"
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Match {}", match_id)))?;

        let mut stored = row_to_match(row)?;
        check_result(&stored, winner)?;

        let result = sqlx::query(
            "UPDATE matches SET status = $2, winner = $3 WHERE id = $1 AND status <> $2",
        )
        .bind(match_id)
        .bind(MatchStatus::Completed.to_string())
        .bind(winner)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, match_id = %match_id, "Failed to record match result");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Match {} already completed",
                match_id
            )));
        }

        stored.status = MatchStatus::Completed;
        stored.winner = Some(winner);
        Ok(stored)
    }
}
