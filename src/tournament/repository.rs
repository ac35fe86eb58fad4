use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{TournamentFormat, TournamentModel, TournamentStatus};
use crate::shared::AppError;

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create(&self, tournament: &TournamentModel) -> Result<(), AppError>;
    async fn get(&self, tournament_id: Uuid) -> Result<Option<TournamentModel>, AppError>;

    /// Moves a tournament forward; backward moves fail with `InvalidTransition`
    async fn update_status(
        &self,
        tournament_id: Uuid,
        status: TournamentStatus,
    ) -> Result<(), AppError>;
}

/// In-memory implementation of TournamentRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryTournamentRepository {
    tournaments: RwLock<HashMap<Uuid, TournamentModel>>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    #[instrument(skip(self, tournament))]
    async fn create(&self, tournament: &TournamentModel) -> Result<(), AppError> {
        debug!(tournament_id = %tournament.id, format = %tournament.format, "Creating tournament in memory");

        let mut tournaments = self.tournaments.write().await;
        if tournaments.contains_key(&tournament.id) {
            warn!(tournament_id = %tournament.id, "Tournament already exists in memory");
            return Err(AppError::Conflict("Tournament already exists".to_string()));
        }
        tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, tournament_id: Uuid) -> Result<Option<TournamentModel>, AppError> {
        let tournaments = self.tournaments.read().await;
        Ok(tournaments.get(&tournament_id).cloned())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        tournament_id: Uuid,
        status: TournamentStatus,
    ) -> Result<(), AppError> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(&tournament_id)
            .ok_or_else(|| AppError::NotFound(format!("Tournament {}", tournament_id)))?;

        if !tournament.status.can_transition_to(status) {
            warn!(
                tournament_id = %tournament_id,
                from = %tournament.status,
                to = %status,
                "Rejected backward status transition"
            );
            return Err(AppError::InvalidTransition {
                from: tournament.status,
                to: status,
            });
        }

        debug!(tournament_id = %tournament_id, from = %tournament.status, to = %status, "Tournament status updated");
        tournament.status = status;
        Ok(())
    }
}

/// PostgreSQL implementation of tournament repository
pub struct PostgresTournamentRepository {
    pool: PgPool,
}

impl PostgresTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(e: impl std::fmt::Display) -> AppError {
    AppError::DatabaseError(format!("Invalid stored value: {}", e))
}

#[async_trait]
impl TournamentRepository for PostgresTournamentRepository {
    #[instrument(skip(self, tournament))]
    async fn create(&self, tournament: &TournamentModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tournaments (id, format, status, start_date, num_groups, advance_count) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(tournament.id)
        .bind(tournament.format.to_string())
        .bind(tournament.status.to_string())
        .bind(tournament.start_date)
        .bind(tournament.num_groups.map(|n| n as i32))
        .bind(tournament.advance_count.map(|n| n as i32))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create tournament in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, tournament_id: Uuid) -> Result<Option<TournamentModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, format, status, start_date, num_groups, advance_count FROM tournaments WHERE id = $1"
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, tournament_id = %tournament_id, "Failed to fetch tournament from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let Some(row) = row else {
            debug!(tournament_id = %tournament_id, "Tournament not found in database");
            return Ok(None);
        };

        let format: String = row.get("format");
        let status: String = row.get("status");
        let num_groups: Option<i32> = row.get("num_groups");
        let advance_count: Option<i32> = row.get("advance_count");

        Ok(Some(TournamentModel {
            id: row.get("id"),
            format: TournamentFormat::from_str(&format).map_err(decode_error)?,
            status: TournamentStatus::from_str(&status).map_err(decode_error)?,
            start_date: row.get("start_date"),
            num_groups: num_groups.map(|n| n.max(0) as u32),
            advance_count: advance_count.map(|n| n.max(0) as u32),
        }))
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        tournament_id: Uuid,
        status: TournamentStatus,
    ) -> Result<(), AppError> {
        // The allowed predecessors are checked inside the UPDATE so a concurrent
        // writer can never move the row backwards.
        let allowed: Vec<String> = [
            TournamentStatus::Upcoming,
            TournamentStatus::Ongoing,
            TournamentStatus::Completed,
        ]
        .into_iter()
        .filter(|from| from.can_transition_to(status))
        .map(|from| from.to_string())
        .collect();

        let result = sqlx::query(
            "UPDATE tournaments SET status = $2 WHERE id = $1 AND status = ANY($3)",
        )
        .bind(tournament_id)
        .bind(status.to_string())
        .bind(&allowed)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, tournament_id = %tournament_id, "Failed to update tournament status");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return match self.get(tournament_id).await? {
                Some(current) => Err(AppError::InvalidTransition {
                    from: current.status,
                    to: status,
                }),
                None => Err(AppError::NotFound(format!("Tournament {}", tournament_id))),
            };
        }

        Ok(())
    }
}
