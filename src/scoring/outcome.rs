use serde::{Deserialize, Serialize};

/// Best-of count used when the caller does not specify one
pub const DEFAULT_BEST_OF: u32 = 3;

/// One of the two sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Side {
    A,
    B,
}

/// Point rules for a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points a side needs before it can take the game
    pub points_to_win: u32,
    /// Required lead over the other side
    pub win_by: u32,
    /// Scores above this are flagged as anomalies during validation
    pub max_plausible_score: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_to_win: 11,
            win_by: 2,
            max_plausible_score: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<Side>,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GamesWon {
    pub a: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome<T> {
    pub complete: bool,
    pub winner: Option<T>,
    pub games_won: GamesWon,
}

impl<T> Default for MatchOutcome<T> {
    fn default() -> Self {
        Self {
            complete: false,
            winner: None,
            games_won: GamesWon::default(),
        }
    }
}

impl ScoringRules {
    /// A game is over once a side reaches `points_to_win` with a lead of at least `win_by`.
    /// Level scores past the target keep the game open (extended play).
    pub fn game_winner(&self, score_a: u32, score_b: u32) -> GameOutcome {
        let (leader, high, low) = if score_a >= score_b {
            (Side::A, score_a, score_b)
        } else {
            (Side::B, score_b, score_a)
        };

        if high >= self.points_to_win && high - low >= self.win_by {
            GameOutcome {
                winner: Some(leader),
                complete: true,
            }
        } else {
            GameOutcome::default()
        }
    }

    /// Tallies game winners in order and stops at the game that decides the match.
    /// Missing entries on the shorter side count as 0.
    pub fn match_winner<T>(
        &self,
        scores_a: &[u32],
        scores_b: &[u32],
        id_a: T,
        id_b: T,
        best_of: u32,
    ) -> MatchOutcome<T> {
        let games_to_win = best_of.max(1).div_ceil(2);
        let games = scores_a.len().max(scores_b.len());
        let mut games_won = GamesWon::default();

        for i in 0..games {
            let a = scores_a.get(i).copied().unwrap_or(0);
            let b = scores_b.get(i).copied().unwrap_or(0);

            match self.game_winner(a, b).winner {
                Some(Side::A) => games_won.a += 1,
                Some(Side::B) => games_won.b += 1,
                None => {}
            }

            if games_won.a >= games_to_win {
                return MatchOutcome {
                    complete: true,
                    winner: Some(id_a),
                    games_won,
                };
            }
            if games_won.b >= games_to_win {
                return MatchOutcome {
                    complete: true,
                    winner: Some(id_b),
                    games_won,
                };
            }
        }

        MatchOutcome::default()
    }
}

/// Game winner under the default rules (11 points, win by 2)
pub fn determine_game_winner(score_a: u32, score_b: u32) -> GameOutcome {
    ScoringRules::default().game_winner(score_a, score_b)
}

/// Match winner under the default rules.
///
/// Games are read in order up to the longer score list, but tallying stops at the game
/// that decides the match: entries after it are not counted in `games_won`, so
/// `[11, 11, 2]` vs `[1, 1, 11]` in a best-of-3 reports 2-0, not 2-1.
pub fn determine_match_winner<T>(
    scores_a: &[u32],
    scores_b: &[u32],
    id_a: T,
    id_b: T,
    best_of: u32,
) -> MatchOutcome<T> {
    ScoringRules::default().match_winner(scores_a, scores_b, id_a, id_b, best_of)
}
