use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pairing::{pair_sequentially, Pairing};

/// Location of a match inside a planned bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlannedMatchRef {
    pub round: u32,
    pub position: u32,
}

/// One side of a planned match: a known participant, or the winner of an earlier match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BracketSlot {
    Resolved { participant_id: Uuid },
    Pending { source: PlannedMatchRef },
}

impl BracketSlot {
    pub fn participant(&self) -> Option<Uuid> {
        match self {
            BracketSlot::Resolved { participant_id } => Some(*participant_id),
            BracketSlot::Pending { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMatch {
    pub at: PlannedMatchRef,
    pub side_a: BracketSlot,
    pub side_b: BracketSlot,
    pub winner: Option<Uuid>,
}

impl PlannedMatch {
    pub fn is_bye(&self) -> bool {
        self.side_a == self.side_b
    }
}

/// A whole knockout bracket laid out ahead of play.
///
/// Round 1 comes from the seeded list; later rounds reference the matches that feed
/// them and fill in as results are resolved. The layout mirrors the rounds that
/// progression actually creates, so it can back a bracket view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedBracket {
    pub rounds: Vec<Vec<PlannedMatch>>,
}

/// Lays out every round of a knockout bracket for already-seeded participants
pub fn plan_knockout(seeded: &[Uuid]) -> PlannedBracket {
    let mut rounds: Vec<Vec<PlannedMatch>> = Vec::new();
    if seeded.len() < 2 {
        return PlannedBracket { rounds };
    }

    let first: Vec<BracketSlot> = seeded
        .iter()
        .map(|&participant_id| BracketSlot::Resolved { participant_id })
        .collect();
    let mut entrants = first;
    let mut round = 1;

    while entrants.len() > 1 {
        let planned: Vec<PlannedMatch> = pair_sequentially(&entrants)
            .into_iter()
            .enumerate()
            .map(|(position, pairing)| {
                let (side_a, side_b) = match pairing {
                    Pairing::Match(a, b) => (a, b),
                    Pairing::Bye(a) => (a, a),
                };
                PlannedMatch {
                    at: PlannedMatchRef {
                        round,
                        position: position as u32,
                    },
                    side_a,
                    side_b,
                    winner: None,
                }
            })
            .collect();

        entrants = planned
            .iter()
            .map(|m| BracketSlot::Pending { source: m.at })
            .collect();
        rounds.push(planned);
        round += 1;
    }

    let mut bracket = PlannedBracket { rounds };
    let opening_byes: Vec<(PlannedMatchRef, Uuid)> = bracket.rounds[0]
        .iter()
        .filter(|m| m.is_bye())
        .filter_map(|m| m.side_a.participant().map(|p| (m.at, p)))
        .collect();
    for (at, participant) in opening_byes {
        bracket.resolve(at, participant);
    }
    bracket
}

impl PlannedBracket {
    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn round(&self, round: u32) -> Option<&[PlannedMatch]> {
        let index = round.checked_sub(1)? as usize;
        self.rounds.get(index).map(Vec::as_slice)
    }

    pub fn get(&self, at: PlannedMatchRef) -> Option<&PlannedMatch> {
        self.round(at.round)?.get(at.position as usize)
    }

    /// Champion, once the final has been resolved
    pub fn champion(&self) -> Option<Uuid> {
        self.rounds.last()?.first()?.winner
    }

    /// Records the winner of a match and fills every slot waiting on it.
    /// Byes whose only slot becomes known resolve in turn. Returns false for an unknown ref.
    pub fn resolve(&mut self, at: PlannedMatchRef, winner: Uuid) -> bool {
        let Some(index) = at.round.checked_sub(1) else {
            return false;
        };
        let Some(planned) = self
            .rounds
            .get_mut(index as usize)
            .and_then(|r| r.get_mut(at.position as usize))
        else {
            return false;
        };
        planned.winner = Some(winner);

        let filled = BracketSlot::Resolved {
            participant_id: winner,
        };
        let mut cascading = Vec::new();
        if let Some(next) = self.rounds.get_mut(at.round as usize) {
            for m in next.iter_mut() {
                let waiting = BracketSlot::Pending { source: at };
                if m.side_a == waiting {
                    m.side_a = filled;
                }
                if m.side_b == waiting {
                    m.side_b = filled;
                }
                if m.is_bye() && m.winner.is_none() && m.side_a == filled {
                    cascading.push(m.at);
                }
            }
        }

        for bye in cascading {
            self.resolve(bye, winner);
        }
        true
    }
}
