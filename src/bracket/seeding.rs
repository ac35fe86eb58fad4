use crate::participant::ParticipantModel;

/// Orders participants by rating, highest first.
///
/// The sort is stable, so equal ratings keep registration order. Callers rely on this
/// as the tie-break rule; do not swap it for an unstable sort.
pub fn seed_by_rating(mut participants: Vec<ParticipantModel>) -> Vec<ParticipantModel> {
    participants.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    participants
}
