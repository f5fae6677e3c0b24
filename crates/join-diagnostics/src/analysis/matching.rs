//! Set overlap between two key sets.

use serde::{Deserialize, Serialize};

use crate::keys::{Key, KeyFrequencies};

/// How the distinct keys of two tables overlap.
///
/// The three key lists partition `unique(x) ∪ unique(y)`. Matched and
/// x-only keys follow x's first-seen order; y-only keys follow y's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub matched_count: u64,
    pub left_only_count: u64,
    pub right_only_count: u64,
    /// `matched_count / unique(x)`; `None` when x has no present keys.
    /// An undefined rate is not a 0% rate.
    pub match_rate: Option<f64>,
    pub matched_keys: Vec<Key>,
    pub left_only_keys: Vec<Key>,
    pub right_only_keys: Vec<Key>,
}

impl MatchAnalysis {
    /// Fraction of y's distinct keys found in x, `None` when y has none.
    pub fn right_match_rate(&self) -> Option<f64> {
        let right_unique = self.matched_count + self.right_only_count;
        (right_unique > 0).then(|| self.matched_count as f64 / right_unique as f64)
    }
}

/// Compare the distinct present keys of `x` and `y`.
pub fn analyze_matches(x: &KeyFrequencies, y: &KeyFrequencies) -> MatchAnalysis {
    let (matched_keys, left_only_keys): (Vec<Key>, Vec<Key>) =
        x.keys().iter().cloned().partition(|k| y.contains(k));

    let right_only_keys: Vec<Key> = y
        .keys()
        .iter()
        .filter(|k| !x.contains(k))
        .cloned()
        .collect();

    let left_unique = x.unique_count();
    let match_rate =
        (left_unique > 0).then(|| matched_keys.len() as f64 / left_unique as f64);

    MatchAnalysis {
        matched_count: matched_keys.len() as u64,
        left_only_count: left_only_keys.len() as u64,
        right_only_count: right_only_keys.len() as u64,
        match_rate,
        matched_keys,
        left_only_keys,
        right_only_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(keys: &[Option<i64>]) -> KeyFrequencies {
        KeyFrequencies::from_keys(keys.iter().map(|k| k.map(Key::from)))
    }

    #[test]
    fn test_partition_and_rate() {
        let x = freq(&[Some(1), Some(2), Some(2), Some(3), None]);
        let y = freq(&[Some(3), Some(4), Some(1)]);

        let m = analyze_matches(&x, &y);
        assert_eq!(m.matched_keys, vec![Key::from(1), Key::from(3)]);
        assert_eq!(m.left_only_keys, vec![Key::from(2)]);
        assert_eq!(m.right_only_keys, vec![Key::from(4)]);
        assert_eq!(m.match_rate, Some(2.0 / 3.0));
        assert_eq!(m.matched_count + m.left_only_count, x.unique_count() as u64);
        assert_eq!(m.matched_count + m.right_only_count, y.unique_count() as u64);
        assert_eq!(m.right_match_rate(), Some(2.0 / 3.0));
    }

    #[test]
    fn test_empty_left_rate_is_undefined() {
        let x = freq(&[None, None]);
        let y = freq(&[Some(1)]);
        let m = analyze_matches(&x, &y);
        assert_eq!(m.match_rate, None);
        assert_eq!(m.right_only_count, 1);
    }

    #[test]
    fn test_no_overlap_is_zero_rate() {
        let x = freq(&[Some(1)]);
        let y = freq(&[Some(2)]);
        assert_eq!(analyze_matches(&x, &y).match_rate, Some(0.0));
    }
}
