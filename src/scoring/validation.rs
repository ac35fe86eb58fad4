use serde::{Deserialize, Serialize};
use std::fmt;

use super::outcome::{MatchOutcome, ScoringRules, Side};
use crate::shared::AppError;

/// A single problem found in a pair of score sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoreIssue {
    LengthMismatch { len_a: usize, len_b: usize },
    Negative { side: Side, index: usize, value: f64 },
    NonInteger { side: Side, index: usize, value: f64 },
    /// Soft anomaly: plausible under extended play but worth a second look
    ImplausiblyHigh { side: Side, index: usize, value: f64, max: u32 },
}

impl fmt::Display for ScoreIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreIssue::LengthMismatch { len_a, len_b } => {
                write!(f, "score lists differ in length: {} vs {}", len_a, len_b)
            }
            ScoreIssue::Negative { side, index, value } => {
                write!(f, "negative score {} for side {} at index {}", value, side, index)
            }
            ScoreIssue::NonInteger { side, index, value } => {
                write!(f, "non-integer score {} for side {} at index {}", value, side, index)
            }
            ScoreIssue::ImplausiblyHigh {
                side,
                index,
                value,
                max,
            } => write!(
                f,
                "score {} for side {} at index {} exceeds {}",
                value, side, index, max
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreValidation {
    pub valid: bool,
    pub errors: Vec<ScoreIssue>,
}

impl ScoreValidation {
    /// Checks raw score entries and collects every issue instead of stopping at the first
    pub fn check(scores_a: &[f64], scores_b: &[f64], rules: &ScoringRules) -> Self {
        let mut errors = Vec::new();

        if scores_a.len() != scores_b.len() {
            errors.push(ScoreIssue::LengthMismatch {
                len_a: scores_a.len(),
                len_b: scores_b.len(),
            });
        }

        for (side, scores) in [(Side::A, scores_a), (Side::B, scores_b)] {
            for (index, &value) in scores.iter().enumerate() {
                if value < 0.0 {
                    errors.push(ScoreIssue::Negative { side, index, value });
                }
                if !value.is_finite() || value.fract() != 0.0 {
                    errors.push(ScoreIssue::NonInteger { side, index, value });
                }
                if value > f64::from(rules.max_plausible_score) {
                    errors.push(ScoreIssue::ImplausiblyHigh {
                        side,
                        index,
                        value,
                        max: rules.max_plausible_score,
                    });
                }
            }
        }

        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.valid {
            Ok(())
        } else {
            Err(AppError::ValidationFailed(self.errors))
        }
    }
}

impl ScoringRules {
    /// Validates raw score entries, then decides the match under best-of-N.
    /// Any issue, the soft upper bound included, rejects the sheet.
    pub fn decide<T>(
        &self,
        scores_a: &[f64],
        scores_b: &[f64],
        id_a: T,
        id_b: T,
        best_of: u32,
    ) -> Result<MatchOutcome<T>, AppError> {
        ScoreValidation::check(scores_a, scores_b, self).into_result()?;

        // validated above: finite, non-negative whole numbers within the sanity bound
        let to_points = |scores: &[f64]| scores.iter().map(|&s| s as u32).collect::<Vec<u32>>();
        Ok(self.match_winner(&to_points(scores_a), &to_points(scores_b), id_a, id_b, best_of))
    }
}

/// Validates a pair of score sheets under the default rules
pub fn validate_scores(scores_a: &[f64], scores_b: &[f64]) -> ScoreValidation {
    ScoreValidation::check(scores_a, scores_b, &ScoringRules::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_scores_are_valid() {
        let result = validate_scores(&[11.0, 9.0, 11.0], &[9.0, 11.0, 7.0]);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn negative_score_reported_with_index() {
        let result = validate_scores(&[11.0, -1.0], &[9.0, 9.0]);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![ScoreIssue::Negative {
                side: Side::A,
                index: 1,
                value: -1.0
            }]
        );
        assert!(result.errors[0].to_string().contains("index 1"));
    }

    #[test]
    fn collects_every_violation_in_one_pass() {
        let result = validate_scores(&[11.0, -1.0, 7.5], &[9.0, 9.0]);
        assert!(!result.valid);
        assert!(result
            .errors
            .contains(&ScoreIssue::LengthMismatch { len_a: 3, len_b: 2 }));
        assert!(result.errors.iter().any(|e| matches!(
            e,
            ScoreIssue::Negative {
                side: Side::A,
                index: 1,
                ..
            }
        )));
        assert!(result.errors.iter().any(|e| matches!(
            e,
            ScoreIssue::NonInteger {
                side: Side::A,
                index: 2,
                ..
            }
        )));
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn scores_above_sanity_bound_are_flagged() {
        let result = validate_scores(&[26.0], &[24.0]);
        assert_eq!(
            result.errors,
            vec![ScoreIssue::ImplausiblyHigh {
                side: Side::A,
                index: 0,
                value: 26.0,
                max: 25
            }]
        );
    }

    #[test]
    fn nan_is_not_an_integer() {
        let result = validate_scores(&[f64::NAN], &[3.0]);
        assert!(!result.valid);
        assert!(matches!(result.errors[0], ScoreIssue::NonInteger { .. }));
    }

    #[test]
    fn into_result_carries_all_issues() {
        let err = validate_scores(&[-2.0], &[-3.0]).into_result().unwrap_err();
        match err {
            AppError::ValidationFailed(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decide_returns_winner_for_clean_sheet() {
        let outcome = ScoringRules::default()
            .decide(&[11.0, 9.0, 11.0], &[9.0, 11.0, 8.0], "A", "B", 3)
            .unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.winner, Some("A"));
    }

    #[test]
    fn decide_rejects_invalid_sheet() {
        let result = ScoringRules::default().decide(&[11.0, -1.0], &[9.0, 9.0], "A", "B", 3);
        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
    }

    #[test]
    fn issues_serialize_with_kind_tag() {
        let json = serde_json::to_value(ScoreIssue::LengthMismatch { len_a: 1, len_b: 2 }).unwrap();
        assert_eq!(json["kind"], "length-mismatch");
        assert_eq!(json["len_b"], 2);
    }
}
