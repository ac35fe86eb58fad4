use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// A persisted match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchModel {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: u32,            // 1-based
    pub position: u32,         // Order within the round
    pub side_a: Uuid,
    pub side_b: Uuid,          // Equal to side_a for a bye
    pub group: Option<u32>,    // Group index during grouped round-robin play
    pub status: MatchStatus,
    pub winner: Option<Uuid>,  // Set only once completed
    pub scheduled_start: DateTime<Utc>,
}

impl MatchModel {
    pub fn is_bye(&self) -> bool {
        self.side_a == self.side_b
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, participant_id: Uuid) -> bool {
        self.side_a == participant_id || self.side_b == participant_id
    }
}

/// A match that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: Uuid,
    pub round: u32,
    pub position: u32,
    pub side_a: Uuid,
    pub side_b: Uuid,
    pub group: Option<u32>,
    pub status: MatchStatus,
    pub winner: Option<Uuid>,
    pub scheduled_start: DateTime<Utc>,
}

impl NewMatch {
    /// A regular two-sided match waiting to be played
    pub fn pairing(
        tournament_id: Uuid,
        round: u32,
        position: u32,
        side_a: Uuid,
        side_b: Uuid,
        scheduled_start: DateTime<Utc>,
    ) -> Self {
        Self {
            tournament_id,
            round,
            position,
            side_a,
            side_b,
            group: None,
            status: MatchStatus::Scheduled,
            winner: None,
            scheduled_start,
        }
    }

    /// An automatic advancement, already completed with the participant as winner
    pub fn bye(
        tournament_id: Uuid,
        round: u32,
        position: u32,
        participant_id: Uuid,
        scheduled_start: DateTime<Utc>,
    ) -> Self {
        Self {
            tournament_id,
            round,
            position,
            side_a: participant_id,
            side_b: participant_id,
            group: None,
            status: MatchStatus::Completed,
            winner: Some(participant_id),
            scheduled_start,
        }
    }

    pub fn in_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn is_bye(&self) -> bool {
        self.side_a == self.side_b
    }

    pub fn into_model(self, id: Uuid) -> MatchModel {
        MatchModel {
            id,
            tournament_id: self.tournament_id,
            round: self.round,
            position: self.position,
            side_a: self.side_a,
            side_b: self.side_b,
            group: self.group,
            status: self.status,
            winner: self.winner,
            scheduled_start: self.scheduled_start,
        }
    }
}
