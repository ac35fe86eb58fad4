// Public API - what other modules can use
pub use models::{TournamentFormat, TournamentModel, TournamentStatus};
pub use repository::{
    InMemoryTournamentRepository, PostgresTournamentRepository, TournamentRepository,
};

// Internal modules
pub mod models;
pub mod repository;
