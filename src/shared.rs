use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use uuid::Uuid;

use crate::matches::repository::MatchRepository;
use crate::participant::repository::ParticipantRepository;
use crate::scoring::ScoreIssue;
use crate::tournament::models::TournamentStatus;
use crate::tournament::repository::TournamentRepository;

/// Repositories the engine reads from and writes to
#[derive(Clone)]
pub struct Repositories {
    pub tournaments: Arc<dyn TournamentRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub matches: Arc<dyn MatchRepository>,
}

impl Repositories {
    pub fn new(
        tournaments: Arc<dyn TournamentRepository>,
        participants: Arc<dyn ParticipantRepository>,
        matches: Arc<dyn MatchRepository>,
    ) -> Self {
        Self {
            tournaments,
            participants,
            matches,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported tournament format: {0}")]
    UnsupportedFormat(String),

    #[error("Round {round} is not complete")]
    RoundIncomplete { round: u32 },

    #[error("Score validation failed: {}", join_issues(.0))]
    ValidationFailed(Vec<ScoreIssue>),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn join_issues(issues: &[ScoreIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-tournament async locks serializing bracket writes.
///
/// Generation and progression for the same tournament share one registry so a
/// read-decide-write sequence never interleaves with another on that tournament.
/// An entry lives only while someone holds or waits for it.
#[derive(Debug, Clone, Default)]
pub struct TournamentLocks {
    locks: Arc<RwLock<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` while holding the tournament's lock
    pub async fn with_lock<F, T>(&self, tournament_id: Uuid, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let lock = self.lock_for(tournament_id).await;
        let output = {
            let _guard = lock.lock().await;
            work.await
        };
        drop(lock);
        self.prune(tournament_id).await;
        output
    }

    /// Number of tournaments currently tracked
    pub async fn tracked(&self) -> usize {
        self.locks.read().await.len()
    }

    async fn lock_for(&self, tournament_id: Uuid) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.locks.read().await;
            if let Some(lock) = guard.get(&tournament_id) {
                return lock.clone();
            }
        }

        let mut guard = self.locks.write().await;
        guard
            .entry(tournament_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the entry when the registry holds the only handle.
    /// Handles are cloned under the read lock, so no waiter can be missed here.
    async fn prune(&self, tournament_id: Uuid) {
        let mut guard = self.locks.write().await;
        if guard
            .get(&tournament_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            guard.remove(&tournament_id);
        }
    }
}
