// Pure scoring rules used by the score-entry flow
//
// Nothing in here touches storage; every function is deterministic in its inputs.

// Public API - what other modules can use
pub use outcome::{
    determine_game_winner, determine_match_winner, GameOutcome, GamesWon, MatchOutcome,
    ScoringRules, Side, DEFAULT_BEST_OF,
};
pub use validation::{validate_scores, ScoreIssue, ScoreValidation};

// Internal modules
mod outcome;
mod validation;
