use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::ParticipantModel;
use crate::shared::AppError;

/// Trait for participant repository operations
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Registers a participant; a user can enter a tournament once
    async fn register(&self, participant: &ParticipantModel) -> Result<(), AppError>;

    /// Participants of a tournament in registration order
    async fn list_by_tournament(&self, tournament_id: Uuid)
        -> Result<Vec<ParticipantModel>, AppError>;
}

/// In-memory implementation of ParticipantRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryParticipantRepository {
    /// tournament_id -> participants in insertion order
    participants: RwLock<HashMap<Uuid, Vec<ParticipantModel>>>,
}

impl InMemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    #[instrument(skip(self, participant))]
    async fn register(&self, participant: &ParticipantModel) -> Result<(), AppError> {
        let mut participants = self.participants.write().await;
        let roster = participants.entry(participant.tournament_id).or_default();

        if roster.iter().any(|p| p.user_id == participant.user_id) {
            warn!(
                tournament_id = %participant.tournament_id,
                user_id = %participant.user_id,
                "User already registered for tournament"
            );
            return Err(AppError::Conflict(
                "User already registered for tournament".to_string(),
            ));
        }

        roster.push(participant.clone());
        debug!(
            tournament_id = %participant.tournament_id,
            participant_id = %participant.id,
            roster_size = roster.len(),
            "Participant registered in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_tournament(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<ParticipantModel>, AppError> {
        let participants = self.participants.read().await;
        Ok(participants
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// PostgreSQL implementation of participant repository
pub struct PostgresParticipantRepository {
    pool: PgPool,
}

impl PostgresParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepository {
    #[instrument(skip(self, participant))]
    async fn register(&self, participant: &ParticipantModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO participants (id, tournament_id, user_id, rating, registered_at) VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(participant.id)
        .bind(participant.tournament_id)
        .bind(participant.user_id)
        .bind(participant.rating)
        .bind(participant.registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                AppError::Conflict("User already registered for tournament".to_string())
            }
            _ => {
                warn!(error = %e, "Failed to register participant in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_tournament(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<ParticipantModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, tournament_id, user_id, rating, registered_at FROM participants WHERE tournament_id = $1 ORDER BY registered_at, seq"
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, tournament_id = %tournament_id, "Failed to list participants");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| ParticipantModel {
                id: row.get("id"),
                tournament_id: row.get("tournament_id"),
                user_id: row.get("user_id"),
                rating: row.get("rating"),
                registered_at: row.get("registered_at"),
            })
            .collect())
    }
}
