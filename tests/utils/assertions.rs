//! Test assertion helpers for generated rounds
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashSet;
use uuid::Uuid;

use bracket_engine::{MatchModel, MatchStatus};

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct RoundAssertion<'a> {
    matches: &'a [MatchModel],
}

impl<'a> RoundAssertion<'a> {
    pub fn of(matches: &'a [MatchModel]) -> Self {
        Self { matches }
    }

    /// Assert the number of two-sided games and byes
    pub fn has_shape(self, games: usize, byes: usize) -> Self {
        let actual_byes = self.matches.iter().filter(|m| m.is_bye()).count();
        assert_eq!(self.matches.len() - actual_byes, games, "games in round");
        assert_eq!(actual_byes, byes, "byes in round");
        self
    }

    /// Assert positions run 0..len in order
    pub fn has_sequential_positions(self) -> Self {
        let positions: Vec<u32> = self.matches.iter().map(|m| m.position).collect();
        let expected: Vec<u32> = (0..self.matches.len() as u32).collect();
        assert_eq!(positions, expected);
        self
    }

    /// Assert every given participant appears in exactly one match
    pub fn covers_each_once(self, participants: &[Uuid]) -> Self {
        let mut seen = HashSet::new();
        for m in self.matches {
            assert!(seen.insert(m.side_a), "{} appears twice", m.side_a);
            if !m.is_bye() {
                assert!(seen.insert(m.side_b), "{} appears twice", m.side_b);
            }
        }
        let expected: HashSet<Uuid> = participants.iter().copied().collect();
        assert_eq!(seen, expected);
        self
    }

    /// Assert byes are stored completed with their participant as winner
    pub fn byes_are_completed(self) -> Self {
        for m in self.matches.iter().filter(|m| m.is_bye()) {
            assert_eq!(m.status, MatchStatus::Completed);
            assert_eq!(m.winner, Some(m.side_a));
        }
        self
    }

    pub fn all_in_round(self, round: u32) -> Self {
        assert!(self.matches.iter().all(|m| m.round == round));
        self
    }
}
