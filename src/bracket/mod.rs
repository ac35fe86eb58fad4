// Bracket generation
//
// Seeding and pairing are pure functions over participant ids; the generator service
// wires them to the repositories.

// Public API - what other modules can use
pub use generator::BracketGenerator;
pub use pairing::{
    build_knockout_round, build_round_robin_round, pair_sequentially, partition_into_groups,
    round_robin_pairs, total_rounds, Pairing,
};
pub use plan::{plan_knockout, BracketSlot, PlannedBracket, PlannedMatch, PlannedMatchRef};
pub use seeding::seed_by_rating;

// Internal modules
mod generator;
mod pairing;
mod plan;
mod seeding;
