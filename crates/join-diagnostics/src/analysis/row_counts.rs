//! Join result size prediction.
//!
//! A join multiplies rows within each matched key group: a key seen `a`
//! times in x and `b` times in y contributes `a * b` inner rows. Unmatched
//! rows (including NA-key rows, which never match) are added back for the
//! outer joins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DiagnosticError;
use crate::keys::KeyFrequencies;

/// The four join flavours whose sizes are predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Full => "full",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for JoinType {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "full" | "outer" | "full_outer" => Ok(JoinType::Full),
            other => Err(DiagnosticError::InvalidInput(format!(
                "unknown join type '{}'",
                other
            ))),
        }
    }
}

/// Predicted result sizes.
///
/// `full == inner + left_unmatched + right_unmatched` holds exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRowCounts {
    pub inner: u64,
    pub left: u64,
    pub right: u64,
    pub full: u64,
    /// x rows with no partner in y, NA-key rows included.
    pub left_unmatched: u64,
    /// y rows with no partner in x, NA-key rows included.
    pub right_unmatched: u64,
}

impl ExpectedRowCounts {
    pub fn for_join(&self, join_type: JoinType) -> u64 {
        match join_type {
            JoinType::Inner => self.inner,
            JoinType::Left => self.left,
            JoinType::Right => self.right,
            JoinType::Full => self.full,
        }
    }
}

fn unmatched_rows(side: &KeyFrequencies, other: &KeyFrequencies) -> Option<u64> {
    side.iter()
        .filter(|(key, _)| !other.contains(key))
        .try_fold(side.na_count(), |acc, (_, count)| acc.checked_add(count))
}

/// Predict the size of every join type.
///
/// Returns `None` if a count would overflow 64 bits.
pub fn predict_row_counts(x: &KeyFrequencies, y: &KeyFrequencies) -> Option<ExpectedRowCounts> {
    let inner = x.iter().try_fold(0u64, |acc, (key, x_count)| {
        let y_count = y.count(key);
        acc.checked_add(x_count.checked_mul(y_count)?)
    })?;

    let left_unmatched = unmatched_rows(x, y)?;
    let right_unmatched = unmatched_rows(y, x)?;

    Some(ExpectedRowCounts {
        inner,
        left: inner.checked_add(left_unmatched)?,
        right: inner.checked_add(right_unmatched)?,
        full: inner
            .checked_add(left_unmatched)?
            .checked_add(right_unmatched)?,
        left_unmatched,
        right_unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;

    fn freq(keys: &[Option<i64>]) -> KeyFrequencies {
        KeyFrequencies::from_keys(keys.iter().map(|k| k.map(Key::from)))
    }

    #[test]
    fn test_duplicate_in_x_only() {
        let x = freq(&[Some(1), Some(2), Some(2), Some(3)]);
        let y = freq(&[Some(1), Some(2), Some(3)]);
        let rows = predict_row_counts(&x, &y).unwrap();
        assert_eq!((rows.inner, rows.left, rows.right, rows.full), (4, 4, 4, 4));
    }

    #[test]
    fn test_products_within_groups() {
        let x = freq(&[Some(1), Some(2)]);
        let y = freq(&[Some(1), Some(1), Some(2), Some(3)]);
        let rows = predict_row_counts(&x, &y).unwrap();
        assert_eq!(rows.inner, 3);
        assert_eq!(rows.left, 3);
        assert_eq!(rows.right, 4);
        assert_eq!(rows.full, 4);
        assert_eq!(rows.right_unmatched, 1);
    }

    #[test]
    fn test_na_keys_are_unmatched() {
        let x = freq(&[Some(1), None, None]);
        let y = freq(&[Some(1), None]);
        let rows = predict_row_counts(&x, &y).unwrap();
        assert_eq!(rows.inner, 1);
        assert_eq!(rows.left_unmatched, 2);
        assert_eq!(rows.right_unmatched, 1);
        assert_eq!(rows.full, 4);
        assert_eq!(rows.for_join(JoinType::Left), 3);
    }

    #[test]
    fn test_empty_inputs() {
        let rows = predict_row_counts(&freq(&[]), &freq(&[])).unwrap();
        assert_eq!(rows.full, 0);
    }

    #[test]
    fn test_join_type_parse() {
        assert_eq!("LEFT".parse::<JoinType>().unwrap(), JoinType::Left);
        assert_eq!("outer".parse::<JoinType>().unwrap(), JoinType::Full);
        assert!("cross".parse::<JoinType>().is_err());
    }
}
