use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::pairing::{build_knockout_round, build_round_robin_round, shuffled, total_rounds};
use super::seeding::seed_by_rating;
use crate::{
    config::EngineConfig,
    matches::{MatchModel, NewMatch},
    shared::{AppError, Repositories, TournamentLocks},
    tournament::{TournamentFormat, TournamentModel, TournamentStatus},
};

const FIRST_ROUND: u32 = 1;

/// Creates the opening round of a tournament and starts it
pub struct BracketGenerator {
    repositories: Repositories,
    locks: TournamentLocks,
    config: EngineConfig,
    shuffle_seed: Option<u64>,
}

impl BracketGenerator {
    pub fn new(repositories: Repositories, locks: TournamentLocks, config: EngineConfig) -> Self {
        Self {
            repositories,
            locks,
            config,
            shuffle_seed: None,
        }
    }

    /// Fixes the Swiss shuffle so draws are reproducible
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Parses a format name before generating; unknown names fail with `UnsupportedFormat`
    pub async fn generate_bracket_str(
        &self,
        tournament_id: Uuid,
        format: &str,
    ) -> Result<Vec<MatchModel>, AppError> {
        let format = TournamentFormat::from_str(format)
            .map_err(|_| AppError::UnsupportedFormat(format.to_string()))?;
        self.generate_bracket(tournament_id, format).await
    }

    /// Generates and stores round 1, then moves the tournament to ongoing.
    ///
    /// Fewer than two participants yields an empty list and leaves the tournament untouched.
    /// If an earlier call stored round 1 but failed to move the status, this call finishes
    /// the move and returns the stored round.
    #[instrument(skip(self))]
    pub async fn generate_bracket(
        &self,
        tournament_id: Uuid,
        format: TournamentFormat,
    ) -> Result<Vec<MatchModel>, AppError> {
        self.locks
            .with_lock(tournament_id, self.generate_locked(tournament_id, format))
            .await
    }

    async fn generate_locked(
        &self,
        tournament_id: Uuid,
        format: TournamentFormat,
    ) -> Result<Vec<MatchModel>, AppError> {
        let tournament = self
            .repositories
            .tournaments
            .get(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {}", tournament_id)))?;

        if tournament.format != format {
            warn!(
                tournament_id = %tournament_id,
                stored = %tournament.format,
                requested = %format,
                "Generating with a format different from the stored one"
            );
        }

        if tournament.status != TournamentStatus::Upcoming {
            return Err(AppError::Conflict(format!(
                "Tournament {} is already {}",
                tournament_id, tournament.status
            )));
        }

        let existing = self
            .repositories
            .matches
            .list_by_tournament(tournament_id)
            .await?;
        if !existing.is_empty() {
            return self.resume_start(tournament_id, existing).await;
        }

        let participants = self
            .repositories
            .participants
            .list_by_tournament(tournament_id)
            .await?;
        if participants.len() < 2 {
            info!(
                tournament_id = %tournament_id,
                participants = participants.len(),
                "Not enough participants to build a bracket"
            );
            return Ok(Vec::new());
        }

        let seeded: Vec<Uuid> = seed_by_rating(participants)
            .into_iter()
            .map(|p| p.id)
            .collect();
        let first_round = self.first_round(&tournament, format, &seeded);
        debug!(
            tournament_id = %tournament_id,
            matches = first_round.len(),
            "Built first round"
        );

        let saved = self.repositories.matches.save_batch(&first_round).await?;
        self.repositories
            .tournaments
            .update_status(tournament_id, TournamentStatus::Ongoing)
            .await?;

        info!(
            tournament_id = %tournament_id,
            format = %format,
            participants = seeded.len(),
            matches = saved.len(),
            planned_rounds = total_rounds(seeded.len()),
            "Bracket generated, tournament ongoing"
        );
        Ok(saved)
    }

    /// Round 1 is stored while the tournament is still upcoming: the status write of an
    /// earlier generation failed. Finishes that write instead of building a second bracket.
    async fn resume_start(
        &self,
        tournament_id: Uuid,
        existing: Vec<MatchModel>,
    ) -> Result<Vec<MatchModel>, AppError> {
        if existing.iter().any(|m| m.round != FIRST_ROUND) {
            return Err(AppError::Conflict(format!(
                "Tournament {} already has a bracket",
                tournament_id
            )));
        }

        warn!(
            tournament_id = %tournament_id,
            matches = existing.len(),
            "Round 1 already stored for an upcoming tournament, completing the status move"
        );
        self.repositories
            .tournaments
            .update_status(tournament_id, TournamentStatus::Ongoing)
            .await?;
        Ok(existing)
    }

    fn first_round(
        &self,
        tournament: &TournamentModel,
        format: TournamentFormat,
        seeded: &[Uuid],
    ) -> Vec<NewMatch> {
        let start = tournament.round_start(FIRST_ROUND, self.config.round_start_time);

        match format {
            TournamentFormat::Knockout => {
                build_knockout_round(tournament.id, FIRST_ROUND, seeded, start)
            }
            TournamentFormat::RoundRobin => {
                let groups = tournament.num_groups.filter(|&n| n > 1);
                build_round_robin_round(tournament.id, FIRST_ROUND, seeded, groups, start)
            }
            TournamentFormat::Swiss => {
                let mut rng = match self.shuffle_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                let drawn = shuffled(seeded, &mut rng);
                build_knockout_round(tournament.id, FIRST_ROUND, &drawn, start)
            }
            TournamentFormat::Grouped => build_round_robin_round(
                tournament.id,
                FIRST_ROUND,
                seeded,
                Some(tournament.group_count()),
                start,
            ),
        }
    }
}
