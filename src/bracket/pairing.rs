use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::matches::NewMatch;

/// Result of pairing one slot of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing<T> {
    Match(T, T),
    /// Odd entrant out, advances without playing
    Bye(T),
}

/// Number of knockout rounds needed to reduce `entrants` to a single winner (ceil(log2 n))
pub fn total_rounds(entrants: usize) -> u32 {
    if entrants < 2 {
        return 0;
    }
    entrants.next_power_of_two().trailing_zeros()
}

/// Pairs entrants in order: 1v2, 3v4, ... The last entrant of an odd list gets a bye.
pub fn pair_sequentially<T: Copy>(entrants: &[T]) -> Vec<Pairing<T>> {
    entrants
        .chunks(2)
        .map(|chunk| match *chunk {
            [a, b] => Pairing::Match(a, b),
            [a] => Pairing::Bye(a),
            _ => unreachable!("chunks(2) yields one or two entrants"),
        })
        .collect()
}

/// Every unordered pair exactly once, in index order
pub fn round_robin_pairs<T: Copy>(entrants: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(entrants.len() * entrants.len().saturating_sub(1) / 2);
    for (i, &a) in entrants.iter().enumerate() {
        for &b in &entrants[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Deals entrants into `num_groups` groups by position: entrant i goes to group i mod n
pub fn partition_into_groups<T: Copy>(entrants: &[T], num_groups: u32) -> Vec<Vec<T>> {
    let num_groups = num_groups.max(1) as usize;
    let mut groups = vec![Vec::new(); num_groups];
    for (index, &entrant) in entrants.iter().enumerate() {
        groups[index % num_groups].push(entrant);
    }
    groups
}

pub fn shuffled<T: Copy, R: Rng + ?Sized>(entrants: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = entrants.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Turns a sequential pairing of participants into unsaved matches for one round
pub fn build_knockout_round(
    tournament_id: Uuid,
    round: u32,
    entrants: &[Uuid],
    scheduled_start: DateTime<Utc>,
) -> Vec<NewMatch> {
    pair_sequentially(entrants)
        .into_iter()
        .enumerate()
        .map(|(position, pairing)| match pairing {
            Pairing::Match(a, b) => NewMatch::pairing(
                tournament_id,
                round,
                position as u32,
                a,
                b,
                scheduled_start,
            ),
            Pairing::Bye(a) => {
                NewMatch::bye(tournament_id, round, position as u32, a, scheduled_start)
            }
        })
        .collect()
}

/// Round-robin matches for one round; with more than one group only same-group pairs are built
pub fn build_round_robin_round(
    tournament_id: Uuid,
    round: u32,
    entrants: &[Uuid],
    num_groups: Option<u32>,
    scheduled_start: DateTime<Utc>,
) -> Vec<NewMatch> {
    let groups = match num_groups {
        Some(n) => partition_into_groups(entrants, n),
        None => vec![entrants.to_vec()],
    };

    let mut matches = Vec::new();
    for (group_index, members) in groups.iter().enumerate() {
        for (a, b) in round_robin_pairs(members) {
            let position = matches.len() as u32;
            let new_match =
                NewMatch::pairing(tournament_id, round, position, a, b, scheduled_start);
            matches.push(match num_groups {
                Some(_) => new_match.in_group(group_index as u32),
                None => new_match,
            });
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(4, 2)]
    #[case(5, 3)]
    #[case(8, 3)]
    #[case(9, 4)]
    #[case(16, 4)]
    #[case(17, 5)]
    fn total_rounds_is_ceil_log2(#[case] entrants: usize, #[case] expected: u32) {
        assert_eq!(total_rounds(entrants), expected);
    }

    #[test]
    fn pairs_neighbours_in_seed_order() {
        let pairings = pair_sequentially(&[1, 2, 3, 4]);
        assert_eq!(pairings, vec![Pairing::Match(1, 2), Pairing::Match(3, 4)]);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    #[case(10)]
    #[case(11)]
    fn odd_lists_get_exactly_one_bye(#[case] n: usize) {
        let entrants: Vec<usize> = (0..n).collect();
        let pairings = pair_sequentially(&entrants);

        let byes: Vec<_> = pairings
            .iter()
            .filter(|p| matches!(p, Pairing::Bye(_)))
            .collect();
        let games = pairings.len() - byes.len();

        assert_eq!(games, n / 2);
        assert_eq!(byes.len(), n % 2);
        if n % 2 == 1 {
            assert_eq!(pairings.last(), Some(&Pairing::Bye(n - 1)));
        }
    }

    #[rstest]
    #[case(2, 1)]
    #[case(3, 3)]
    #[case(5, 10)]
    #[case(8, 28)]
    fn round_robin_covers_each_pair_once(#[case] n: usize, #[case] expected: usize) {
        let entrants: Vec<usize> = (0..n).collect();
        let pairs = round_robin_pairs(&entrants);
        assert_eq!(pairs.len(), expected);

        let unique: HashSet<(usize, usize)> = pairs
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        assert_eq!(unique.len(), expected);
        assert!(pairs.iter().all(|(a, b)| a != b));
    }

    #[test]
    fn groups_are_dealt_round_robin() {
        let groups = partition_into_groups(&[0, 1, 2, 3, 4, 5, 6], 3);
        assert_eq!(groups, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn grouped_round_robin_never_crosses_groups() {
        let entrants: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let matches = build_round_robin_round(Uuid::nil(), 1, &entrants, Some(2), Utc::now());
        let groups = partition_into_groups(&entrants, 2);

        // two groups of four: 6 pairs each
        assert_eq!(matches.len(), 12);
        for m in &matches {
            let group = &groups[m.group.unwrap() as usize];
            assert!(group.contains(&m.side_a));
            assert!(group.contains(&m.side_b));
        }
        let positions: Vec<u32> = matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, (0..12).collect::<Vec<u32>>());
    }

    #[test]
    fn knockout_round_marks_bye_completed() {
        let entrants: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let matches = build_knockout_round(Uuid::nil(), 1, &entrants, Utc::now());

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].side_a, entrants[0]);
        assert_eq!(matches[0].side_b, entrants[1]);
        assert!(matches[1].is_bye());
        assert_eq!(matches[1].winner, Some(entrants[2]));
    }

    #[test]
    fn shuffle_keeps_every_entrant() {
        let entrants: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut result = shuffled(&entrants, &mut rng);
        result.sort_unstable();
        assert_eq!(result, entrants);
    }
}
