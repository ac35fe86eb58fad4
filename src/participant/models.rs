use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered entrant of one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantModel {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub rating: f64,                  // Seeding only, fixed once the tournament starts
    pub registered_at: DateTime<Utc>, // Registration order breaks rating ties
}

impl ParticipantModel {
    pub fn new(tournament_id: Uuid, user_id: Uuid, rating: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            user_id,
            rating,
            registered_at: Utc::now(),
        }
    }
}
