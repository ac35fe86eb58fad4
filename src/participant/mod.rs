// Public API - what other modules can use
pub use models::ParticipantModel;
pub use repository::{
    InMemoryParticipantRepository, ParticipantRepository, PostgresParticipantRepository,
};

// Internal modules
pub mod models;
pub mod repository;
