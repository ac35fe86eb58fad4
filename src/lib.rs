// Library crate for tournament bracket generation and round progression
// This file exposes the public API for integration tests and embedding services

pub mod bracket;
pub mod config;
pub mod matches;
pub mod participant;
pub mod progression;
pub mod scoring;
pub mod shared;
pub mod tournament;

// Re-export commonly used types for easier access in tests
pub use bracket::{plan_knockout, total_rounds, BracketGenerator, PlannedBracket};
pub use config::{ConfigError, DatabaseConfig, EngineConfig};
pub use matches::{MatchModel, MatchRepository, MatchStatus};
pub use participant::{ParticipantModel, ParticipantRepository};
pub use progression::{Advancement, ProgressionTracker};
pub use scoring::{
    determine_game_winner, determine_match_winner, validate_scores, MatchOutcome, ScoringRules,
};
pub use shared::{AppError, Repositories, TournamentLocks};
pub use tournament::{TournamentFormat, TournamentModel, TournamentRepository, TournamentStatus};
