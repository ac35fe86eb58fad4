// Public API - what other modules can use
pub use models::{MatchModel, MatchStatus, NewMatch};
pub use repository::{InMemoryMatchRepository, MatchRepository, PostgresMatchRepository};

// Internal modules
pub mod models;
pub mod repository;
