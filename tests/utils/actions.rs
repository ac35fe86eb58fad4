#![allow(dead_code)] // Test utilities may not all be used in every test

use uuid::Uuid;

use bracket_engine::{AppError, MatchModel, TournamentStatus};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub fn tournament_id(&self) -> Uuid {
        self.tournament.id
    }

    /// Participant ids in registration order
    pub fn participant_ids(&self) -> Vec<Uuid> {
        self.participants.iter().map(|p| p.id).collect()
    }

    pub async fn generate(&self) -> Vec<MatchModel> {
        self.generator
            .generate_bracket(self.tournament.id, self.tournament.format)
            .await
            .unwrap()
    }

    pub async fn all_matches(&self) -> Vec<MatchModel> {
        self.repositories
            .matches
            .list_by_tournament(self.tournament.id)
            .await
            .unwrap()
    }

    pub async fn round_matches(&self, round: u32) -> Vec<MatchModel> {
        self.all_matches()
            .await
            .into_iter()
            .filter(|m| m.round == round)
            .collect()
    }

    pub async fn current_round(&self) -> u32 {
        self.all_matches()
            .await
            .iter()
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    }

    pub async fn status(&self) -> TournamentStatus {
        self.repositories
            .tournaments
            .get(self.tournament.id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    /// Validates a score sheet, decides the match and stores the result.
    /// Returns `None` when the sheet does not decide the match yet.
    pub async fn enter_scores(
        &self,
        match_id: Uuid,
        scores_a: &[f64],
        scores_b: &[f64],
    ) -> Result<Option<MatchModel>, AppError> {
        let stored = self
            .all_matches()
            .await
            .into_iter()
            .find(|m| m.id == match_id)
            .ok_or_else(|| AppError::NotFound(format!("Match {}", match_id)))?;

        let outcome = self.config.scoring.decide(
            scores_a,
            scores_b,
            stored.side_a,
            stored.side_b,
            self.config.best_of,
        )?;

        match outcome.winner {
            Some(winner) => self
                .repositories
                .matches
                .record_result(match_id, winner)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    /// Completes every open match of the current round with the chosen side winning
    pub async fn play_round_with(&self, pick: impl Fn(&MatchModel) -> Uuid) {
        let round = self.current_round().await;
        for m in self.round_matches(round).await {
            if !m.is_completed() {
                self.repositories
                    .matches
                    .record_result(m.id, pick(&m))
                    .await
                    .unwrap();
            }
        }
    }

    /// Side A (the better seed of each pairing) wins every open match
    pub async fn play_round(&self) {
        self.play_round_with(|m| m.side_a).await;
    }

    /// Plays and advances until the tournament completes; returns the number of rounds played
    pub async fn play_to_completion(&self) -> u32 {
        let mut rounds = 0;
        while self.status().await != TournamentStatus::Completed {
            self.play_round().await;
            rounds += 1;
            self.tracker
                .check_and_advance(self.tournament.id)
                .await
                .unwrap();
            assert!(rounds <= 64, "tournament never completed");
        }
        rounds
    }
}
