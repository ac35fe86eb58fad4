use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::rounds::{evaluate_current_round, RoundState};
use crate::{
    bracket::{build_knockout_round, partition_into_groups, seed_by_rating},
    config::EngineConfig,
    matches::MatchModel,
    participant::ParticipantModel,
    shared::{AppError, Repositories, TournamentLocks},
    tournament::{TournamentFormat, TournamentModel, TournamentStatus},
};

/// Result of a progression check
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Advancement {
    pub advanced: bool,
    pub new_matches: Vec<MatchModel>,
    /// Set by the call that completed the tournament
    pub champion: Option<Uuid>,
}

impl Advancement {
    fn none() -> Self {
        Self::default()
    }
}

/// What a progression attempt found or did
#[derive(Debug)]
enum Progress {
    /// Format without progressive rounds
    NotApplicable(TournamentFormat),
    NotStarted,
    AlreadyCompleted,
    Incomplete { round: u32 },
    Crowned { champion: Uuid },
    /// Another writer stored the next round first
    Superseded { round: u32 },
    Advanced(Vec<MatchModel>),
}

/// Watches a tournament's rounds and creates the next one once the current round is done
pub struct ProgressionTracker {
    repositories: Repositories,
    locks: TournamentLocks,
    config: EngineConfig,
}

impl ProgressionTracker {
    pub fn new(repositories: Repositories, locks: TournamentLocks, config: EngineConfig) -> Self {
        Self {
            repositories,
            locks,
            config,
        }
    }

    /// Advances a knockout bracket when its current round is complete.
    ///
    /// Safe to call after every score update: incomplete rounds, finished tournaments and
    /// formats without progressive rounds all report `advanced = false`. The call that
    /// decides the final also reports the champion.
    #[instrument(skip(self))]
    pub async fn check_and_advance(&self, tournament_id: Uuid) -> Result<Advancement, AppError> {
        match self.progress(tournament_id).await? {
            Progress::Advanced(new_matches) => Ok(Advancement {
                advanced: true,
                new_matches,
                champion: None,
            }),
            Progress::Crowned { champion } => Ok(Advancement {
                champion: Some(champion),
                ..Advancement::none()
            }),
            other => {
                debug!(tournament_id = %tournament_id, outcome = ?other, "No advancement");
                Ok(Advancement::none())
            }
        }
    }

    /// Explicit next-round request; preconditions that `check_and_advance` tolerates are errors here.
    ///
    /// Returns an empty list when the finished round produced the champion.
    #[instrument(skip(self))]
    pub async fn advance_round(&self, tournament_id: Uuid) -> Result<Vec<MatchModel>, AppError> {
        match self.progress(tournament_id).await? {
            Progress::Advanced(new_matches) => Ok(new_matches),
            Progress::Crowned { .. } => Ok(Vec::new()),
            Progress::NotApplicable(format) => Err(AppError::UnsupportedFormat(format!(
                "{} has no progressive rounds",
                format
            ))),
            Progress::NotStarted => Err(AppError::NotFound(format!(
                "Bracket for tournament {}",
                tournament_id
            ))),
            Progress::AlreadyCompleted => Err(AppError::Conflict(format!(
                "Tournament {} is already completed",
                tournament_id
            ))),
            Progress::Incomplete { round } => Err(AppError::RoundIncomplete { round }),
            Progress::Superseded { round } => Err(AppError::Conflict(format!(
                "Round {} was already created",
                round
            ))),
        }
    }

    async fn progress(&self, tournament_id: Uuid) -> Result<Progress, AppError> {
        self.locks
            .with_lock(tournament_id, self.progress_locked(tournament_id))
            .await
    }

    async fn progress_locked(&self, tournament_id: Uuid) -> Result<Progress, AppError> {
        let tournament = self.load_tournament(tournament_id).await?;
        if tournament.is_completed() {
            return Ok(Progress::AlreadyCompleted);
        }
        if matches!(
            tournament.format,
            TournamentFormat::RoundRobin | TournamentFormat::Swiss
        ) {
            return Ok(Progress::NotApplicable(tournament.format));
        }

        let matches = self
            .repositories
            .matches
            .list_by_tournament(tournament_id)
            .await?;

        let state = evaluate_current_round(&matches);
        if tournament.format == TournamentFormat::Grouped && state.round() <= 1 {
            // group play only moves on through advance_groups_to_knockout
            return Ok(Progress::NotApplicable(tournament.format));
        }

        match state {
            RoundState::Empty => Ok(Progress::NotStarted),
            RoundState::Incomplete { round } => Ok(Progress::Incomplete { round }),
            RoundState::Finished { round, winners } => {
                self.advance_with(&tournament, round, winners).await
            }
        }
    }

    /// Pairs the winners of `round` into the next round, or crowns the last one standing
    async fn advance_with(
        &self,
        tournament: &TournamentModel,
        round: u32,
        winners: Vec<Uuid>,
    ) -> Result<Progress, AppError> {
        if let [champion] = winners[..] {
            self.complete_tournament(tournament.id, champion).await?;
            return Ok(Progress::Crowned { champion });
        }

        let next_round = round + 1;
        let start = tournament.round_start(next_round, self.config.round_start_time);
        let next = build_knockout_round(tournament.id, next_round, &winners, start);

        match self.repositories.matches.save_batch(&next).await {
            Ok(saved) => {
                info!(
                    tournament_id = %tournament.id,
                    round = next_round,
                    matches = saved.len(),
                    "Next round created"
                );
                Ok(Progress::Advanced(saved))
            }
            Err(AppError::Conflict(reason)) => {
                warn!(
                    tournament_id = %tournament.id,
                    round = next_round,
                    %reason,
                    "Next round already stored by another writer"
                );
                Ok(Progress::Superseded { round: next_round })
            }
            Err(e) => Err(e),
        }
    }

    async fn complete_tournament(&self, tournament_id: Uuid, champion: Uuid) -> Result<(), AppError> {
        self.repositories
            .tournaments
            .update_status(tournament_id, TournamentStatus::Completed)
            .await?;
        info!(tournament_id = %tournament_id, champion = %champion, "Tournament completed");
        Ok(())
    }

    async fn load_tournament(&self, tournament_id: Uuid) -> Result<TournamentModel, AppError> {
        self.repositories
            .tournaments
            .get(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {}", tournament_id)))
    }

    /// Ends group play: the top finishers of each group are re-seeded by rating and
    /// paired into the first knockout round.
    ///
    /// Group rank is by wins; equal wins keep the order members were dealt into the group.
    #[instrument(skip(self))]
    pub async fn advance_groups_to_knockout(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<MatchModel>, AppError> {
        self.locks
            .with_lock(tournament_id, self.groups_to_knockout_locked(tournament_id))
            .await
    }

    async fn groups_to_knockout_locked(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<MatchModel>, AppError> {
        let tournament = self.load_tournament(tournament_id).await?;
        if tournament.format != TournamentFormat::Grouped {
            return Err(AppError::UnsupportedFormat(format!(
                "{} has no group stage",
                tournament.format
            )));
        }
        if tournament.is_completed() {
            return Err(AppError::Conflict(format!(
                "Tournament {} is already completed",
                tournament_id
            )));
        }

        let matches = self
            .repositories
            .matches
            .list_by_tournament(tournament_id)
            .await?;
        if matches.iter().any(|m| m.round > 1) {
            return Err(AppError::Conflict(format!(
                "Tournament {} already has a knockout stage",
                tournament_id
            )));
        }
        match evaluate_current_round(&matches) {
            RoundState::Empty => {
                return Err(AppError::NotFound(format!(
                    "Bracket for tournament {}",
                    tournament_id
                )))
            }
            RoundState::Incomplete { round } => return Err(AppError::RoundIncomplete { round }),
            RoundState::Finished { .. } => {}
        }

        let participants = self
            .repositories
            .participants
            .list_by_tournament(tournament_id)
            .await?;
        let qualifiers = group_qualifiers(&tournament, participants, &matches);
        debug!(
            tournament_id = %tournament_id,
            qualifiers = qualifiers.len(),
            "Group stage qualifiers selected"
        );

        let seeded: Vec<Uuid> = seed_by_rating(qualifiers)
            .into_iter()
            .map(|p| p.id)
            .collect();
        if seeded.is_empty() {
            return Err(AppError::Conflict(format!(
                "Tournament {} has no group stage qualifiers",
                tournament_id
            )));
        }

        match self.advance_with(&tournament, 1, seeded).await? {
            Progress::Advanced(saved) => Ok(saved),
            Progress::Crowned { .. } => Ok(Vec::new()),
            Progress::Superseded { round } => Err(AppError::Conflict(format!(
                "Round {} was already created",
                round
            ))),
            other => Err(AppError::Conflict(format!(
                "Unexpected group stage outcome: {:?}",
                other
            ))),
        }
    }
}

/// Top finishers of each group in group order
fn group_qualifiers(
    tournament: &TournamentModel,
    participants: Vec<ParticipantModel>,
    matches: &[MatchModel],
) -> Vec<ParticipantModel> {
    let mut wins: HashMap<Uuid, u32> = HashMap::new();
    for m in matches.iter().filter(|m| m.round == 1 && !m.is_bye()) {
        if let Some(winner) = m.winner {
            *wins.entry(winner).or_default() += 1;
        }
    }

    let seeded = seed_by_rating(participants);
    let groups = partition_into_groups(&seeded.iter().collect::<Vec<_>>(), tournament.group_count());
    let per_group = tournament.qualifiers_per_group() as usize;

    groups
        .into_iter()
        .flat_map(|mut members| {
            members.sort_by_key(|p| std::cmp::Reverse(wins.get(&p.id).copied().unwrap_or(0)));
            members.into_iter().take(per_group).cloned().collect::<Vec<_>>()
        })
        .collect()
}
