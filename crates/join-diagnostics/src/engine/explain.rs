//! Accounting for the size of a join result.
//!
//! Every explanation is relative to the row count of x:
//!
//! ```text
//! inner = x_rows - x_unmatched + duplicate_extra
//! left  = x_rows + duplicate_extra
//! right = inner + y_unmatched
//! full  = left + y_unmatched
//! ```
//!
//! where `duplicate_extra` is the rows added because a matched x row pairs
//! with several y rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::analysis::{JoinType, predict_row_counts};
use crate::error::Result;
use crate::keys::{KeyFrequencies, KeySpec, TableSide, derive_keys};
use crate::table::Table;

/// One cause of a difference between the x row count and the result size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExplanationReason {
    /// Matched rows repeated because their key occurs several times in y.
    DuplicateMultiplication { side: TableSide, extra_rows: u64 },
    /// Rows whose key has no partner and are dropped by this join type.
    UnmatchedDropped { side: TableSide, rows: u64 },
    /// Unmatched rows from the other table that this join type keeps.
    UnmatchedAdded { side: TableSide, rows: u64 },
    /// Rows with a missing key; they never match.
    MissingKeys { side: TableSide, rows: u64, dropped: bool },
    /// The observed size differs from what the keys predict.
    PredictionMismatch { predicted: u64, actual: u64 },
}

impl fmt::Display for ExplanationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplanationReason::DuplicateMultiplication { side, extra_rows } => write!(
                f,
                "+{} row(s): duplicate keys in {} repeat matched rows",
                extra_rows, side
            ),
            ExplanationReason::UnmatchedDropped { side, rows } => write!(
                f,
                "-{} row(s): keys in {} with no match are dropped",
                rows, side
            ),
            ExplanationReason::UnmatchedAdded { side, rows } => write!(
                f,
                "+{} row(s): unmatched rows from {} are kept",
                rows, side
            ),
            ExplanationReason::MissingKeys {
                side,
                rows,
                dropped: true,
            } => write!(f, "-{} row(s): missing keys in {} never match", rows, side),
            ExplanationReason::MissingKeys { side, rows, .. } => write!(
                f,
                "{} row(s) in {} have missing keys and stay unmatched",
                rows, side
            ),
            ExplanationReason::PredictionMismatch { predicted, actual } => write!(
                f,
                "observed {} row(s) but the keys predict {}; the join used different keys or data",
                actual, predicted
            ),
        }
    }
}

/// Why a join has (or would have) the size it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinExplanation {
    pub join_type: JoinType,
    pub x_rows: u64,
    pub y_rows: u64,
    /// `None` if the prediction overflows.
    pub predicted_rows: Option<u64>,
    pub actual_rows: Option<u64>,
    /// Result size minus `x_rows`, using the actual size when known.
    pub row_change: i64,
    pub reasons: Vec<ExplanationReason>,
}

impl JoinExplanation {
    /// One-line summary such as `left join: 4 -> 6 rows (+2)`.
    pub fn headline(&self) -> String {
        let result = self.actual_rows.or(self.predicted_rows);
        match result {
            Some(rows) => format!(
                "{} join: {} -> {} rows ({:+})",
                self.join_type, self.x_rows, rows, self.row_change
            ),
            None => format!("{} join: result size overflows", self.join_type),
        }
    }
}

fn duplicate_extra(x: &KeyFrequencies, y: &KeyFrequencies) -> u64 {
    x.iter()
        .map(|(key, x_count)| x_count.saturating_mul(y.count(key).saturating_sub(1)))
        .fold(0u64, u64::saturating_add)
}

/// Explain the size of a `join_type` join of `x` and `y` on `key_spec`.
///
/// When `actual_rows` is given it is compared with the prediction.
pub fn explain(
    x: &Table,
    y: &Table,
    key_spec: &KeySpec,
    join_type: JoinType,
    actual_rows: Option<u64>,
) -> Result<JoinExplanation> {
    let x_freq = derive_keys(x, &key_spec.x_columns(), TableSide::X)?.frequencies();
    let y_freq = derive_keys(y, &key_spec.y_columns(), TableSide::Y)?.frequencies();

    let counts = predict_row_counts(&x_freq, &y_freq);
    let predicted_rows = counts.map(|c| c.for_join(join_type));
    let x_rows = x_freq.row_count();

    let mut reasons = Vec::new();

    let extra = duplicate_extra(&x_freq, &y_freq);
    if extra > 0 {
        reasons.push(ExplanationReason::DuplicateMultiplication {
            side: TableSide::Y,
            extra_rows: extra,
        });
    }

    let drops_x = matches!(join_type, JoinType::Inner | JoinType::Right);
    let keeps_y = matches!(join_type, JoinType::Right | JoinType::Full);

    if let Some(c) = &counts {
        let x_na = x_freq.na_count();
        let x_unmatched_keys = c.left_unmatched - x_na;
        if drops_x && x_unmatched_keys > 0 {
            reasons.push(ExplanationReason::UnmatchedDropped {
                side: TableSide::X,
                rows: x_unmatched_keys,
            });
        }
        if x_na > 0 {
            reasons.push(ExplanationReason::MissingKeys {
                side: TableSide::X,
                rows: x_na,
                dropped: drops_x,
            });
        }
        if keeps_y && c.right_unmatched > 0 {
            reasons.push(ExplanationReason::UnmatchedAdded {
                side: TableSide::Y,
                rows: c.right_unmatched,
            });
        }
    }

    if let (Some(predicted), Some(actual)) = (predicted_rows, actual_rows) {
        if predicted != actual {
            warn!(
                "Observed {} join size {} differs from predicted {}",
                join_type, actual, predicted
            );
            reasons.push(ExplanationReason::PredictionMismatch { predicted, actual });
        }
    }

    let result = actual_rows.or(predicted_rows).unwrap_or(u64::MAX);
    let row_change = (i128::from(result) - i128::from(x_rows))
        .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

    debug!("{} join explained by {} reason(s)", join_type, reasons.len());

    Ok(JoinExplanation {
        join_type,
        x_rows,
        y_rows: y_freq.row_count(),
        predicted_rows,
        actual_rows,
        row_change,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn ids(values: &[Option<i64>]) -> Table {
        Table::new(vec![Column::integer("id", values.iter().copied())]).unwrap()
    }

    #[test]
    fn test_left_join_growth_from_y_duplicates() {
        let x = ids(&[Some(1), Some(2)]);
        let y = ids(&[Some(1), Some(1), Some(1), Some(2)]);
        let e = explain(&x, &y, &KeySpec::shared(["id"]), JoinType::Left, None).unwrap();

        assert_eq!(e.predicted_rows, Some(4));
        assert_eq!(e.row_change, 2);
        assert_eq!(
            e.reasons,
            vec![ExplanationReason::DuplicateMultiplication {
                side: TableSide::Y,
                extra_rows: 2
            }]
        );
        assert_eq!(e.headline(), "left join: 2 -> 4 rows (+2)");
    }

    #[test]
    fn test_inner_join_shrinks_from_unmatched_and_missing() {
        let x = ids(&[Some(1), Some(2), None]);
        let y = ids(&[Some(1), Some(3)]);
        let e = explain(&x, &y, &KeySpec::shared(["id"]), JoinType::Inner, None).unwrap();

        assert_eq!(e.predicted_rows, Some(1));
        assert_eq!(e.row_change, -2);
        assert!(e.reasons.contains(&ExplanationReason::UnmatchedDropped {
            side: TableSide::X,
            rows: 1
        }));
        assert!(e.reasons.contains(&ExplanationReason::MissingKeys {
            side: TableSide::X,
            rows: 1,
            dropped: true
        }));
    }

    #[test]
    fn test_full_join_adds_unmatched_y() {
        let x = ids(&[Some(1)]);
        let y = ids(&[Some(1), Some(5), Some(6)]);
        let e = explain(&x, &y, &KeySpec::shared(["id"]), JoinType::Full, None).unwrap();
        assert_eq!(e.predicted_rows, Some(3));
        assert_eq!(
            e.reasons,
            vec![ExplanationReason::UnmatchedAdded {
                side: TableSide::Y,
                rows: 2
            }]
        );
    }

    #[test]
    fn test_actual_size_mismatch_reported() {
        let x = ids(&[Some(1)]);
        let e = explain(&x, &x, &KeySpec::shared(["id"]), JoinType::Inner, Some(3)).unwrap();
        assert_eq!(e.row_change, 2);
        assert!(e.reasons.contains(&ExplanationReason::PredictionMismatch {
            predicted: 1,
            actual: 3
        }));
    }
}
