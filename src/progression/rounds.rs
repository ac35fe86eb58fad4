use uuid::Uuid;

use crate::matches::MatchModel;

/// Snapshot of the latest round of a tournament
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RoundState {
    /// No matches stored yet
    Empty,
    Incomplete { round: u32 },
    /// Every match in `round` is decided; winners are in position order
    Finished { round: u32, winners: Vec<Uuid> },
}

impl RoundState {
    pub(crate) fn round(&self) -> u32 {
        match self {
            RoundState::Empty => 0,
            RoundState::Incomplete { round } | RoundState::Finished { round, .. } => *round,
        }
    }
}

/// Looks at the highest stored round only; earlier rounds are settled by construction
pub(crate) fn evaluate_current_round(matches: &[MatchModel]) -> RoundState {
    let Some(round) = matches.iter().map(|m| m.round).max() else {
        return RoundState::Empty;
    };

    let mut current: Vec<&MatchModel> = matches.iter().filter(|m| m.round == round).collect();
    current.sort_by_key(|m| m.position);

    let winners: Option<Vec<Uuid>> = current
        .iter()
        .map(|m| if m.is_completed() { m.winner } else { None })
        .collect();

    match winners {
        Some(winners) => RoundState::Finished { round, winners },
        None => RoundState::Incomplete { round },
    }
}
