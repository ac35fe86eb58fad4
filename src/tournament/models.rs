use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Bracket format of a tournament
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TournamentFormat {
    Knockout,
    RoundRobin,
    Swiss,
    Grouped,
}

/// Lifecycle status, only ever moving forward
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl TournamentStatus {
    fn rank(self) -> u8 {
        match self {
            TournamentStatus::Upcoming => 0,
            TournamentStatus::Ongoing => 1,
            TournamentStatus::Completed => 2,
        }
    }

    /// Forward moves and staying put are allowed, going back never is
    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// Number of qualifiers per group when a grouped tournament does not say
pub const DEFAULT_ADVANCE_COUNT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentModel {
    pub id: Uuid,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub start_date: NaiveDate,
    pub num_groups: Option<u32>,
    pub advance_count: Option<u32>,
}

impl TournamentModel {
    /// Creates an upcoming tournament with a generated ID
    pub fn new(format: TournamentFormat, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            format,
            status: TournamentStatus::Upcoming,
            start_date,
            num_groups: None,
            advance_count: None,
        }
    }

    pub fn with_groups(mut self, num_groups: u32, advance_count: u32) -> Self {
        self.num_groups = Some(num_groups);
        self.advance_count = Some(advance_count);
        self
    }

    /// Group count, 1 when the tournament is not split into groups
    pub fn group_count(&self) -> u32 {
        self.num_groups.unwrap_or(1).max(1)
    }

    /// Qualifiers taken from each group, at least 1
    pub fn qualifiers_per_group(&self) -> u32 {
        self.advance_count.unwrap_or(DEFAULT_ADVANCE_COUNT).max(1)
    }

    /// Start of a round: round 1 on the start date, each later round one day after the previous
    pub fn round_start(&self, round: u32, time_of_day: NaiveTime) -> DateTime<Utc> {
        let offset = TimeDelta::days(i64::from(round.saturating_sub(1)));
        (self.start_date + offset).and_time(time_of_day).and_utc()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("knockout", TournamentFormat::Knockout)]
    #[case("round-robin", TournamentFormat::RoundRobin)]
    #[case("swiss", TournamentFormat::Swiss)]
    #[case("grouped", TournamentFormat::Grouped)]
    fn format_parses_from_wire_name(#[case] raw: &str, #[case] expected: TournamentFormat) {
        assert_eq!(TournamentFormat::from_str(raw).unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(TournamentFormat::from_str("double-elimination").is_err());
    }

    #[test]
    fn status_only_moves_forward() {
        use TournamentStatus::*;
        assert!(Upcoming.can_transition_to(Ongoing));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(Upcoming.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Ongoing));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Ongoing.can_transition_to(Upcoming));
    }

    #[test]
    fn rounds_start_on_consecutive_days() {
        let tournament = TournamentModel::new(
            TournamentFormat::Knockout,
            NaiveDate::from_ymd_opt(2026, 3, 30).unwrap(),
        );
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        assert_eq!(
            tournament.round_start(1, eight).to_rfc3339(),
            "2026-03-30T08:00:00+00:00"
        );
        assert_eq!(
            tournament.round_start(3, eight).to_rfc3339(),
            "2026-04-01T08:00:00+00:00"
        );
    }

    #[test]
    fn serializes_with_kebab_case_names() {
        let tournament = TournamentModel::new(
            TournamentFormat::RoundRobin,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        );
        let json = serde_json::to_value(&tournament).unwrap();
        assert_eq!(json["format"], "round-robin");
        assert_eq!(json["status"], "upcoming");
    }

    #[test]
    fn group_defaults() {
        let tournament = TournamentModel::new(
            TournamentFormat::Grouped,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        );
        assert_eq!(tournament.group_count(), 1);
        assert_eq!(tournament.qualifiers_per_group(), DEFAULT_ADVANCE_COUNT);

        let tournament = tournament.with_groups(4, 1);
        assert_eq!(tournament.group_count(), 4);
        assert_eq!(tournament.qualifiers_per_group(), 1);
    }

    #[test]
    fn zero_group_settings_clamp_to_one() {
        let tournament = TournamentModel::new(
            TournamentFormat::Grouped,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .with_groups(0, 0);
        assert_eq!(tournament.group_count(), 1);
        assert_eq!(tournament.qualifiers_per_group(), 1);
    }
}
