//! Edit-distance suggestions for unmatched keys.
//!
//! This is the only quadratic routine in the crate. Its cost is bounded by
//! comparing at most `left_sample` unmatched x keys against at most
//! `right_sample` y keys (the first ones in first-seen order). The caps
//! bound cost; they do not guarantee every near match is found.

use std::collections::HashSet;

use super::{Issue, IssueDetail, IssueKind, NearMatch, Severity};
use crate::config::AnalysisOptions;
use crate::keys::TableSide;
use crate::table::Column;

/// Sampling caps and thresholds for near-match search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearMatchLimits {
    pub max_distance: usize,
    pub max_candidates: usize,
    pub left_sample: usize,
    pub right_sample: usize,
    pub min_length: usize,
}

impl From<&AnalysisOptions> for NearMatchLimits {
    fn from(options: &AnalysisOptions) -> Self {
        Self {
            max_distance: options.near_match_max_distance,
            max_candidates: options.near_match_max_candidates,
            left_sample: options.near_match_left_sample,
            right_sample: options.near_match_right_sample,
            min_length: options.near_match_min_length,
        }
    }
}

impl Default for NearMatchLimits {
    fn default() -> Self {
        Self::from(&AnalysisOptions::default())
    }
}

/// Levenshtein distance over Unicode scalar values, unit costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Pair unmatched left keys with right keys within `max_distance` edits.
///
/// Exact matches (distance 0) are not near matches. Results are sorted by
/// distance; equal distances keep left-then-right order.
pub fn find_near_matches(left: &[&str], right: &[&str], limits: &NearMatchLimits) -> Vec<NearMatch> {
    let right: Vec<(&str, usize)> = right
        .iter()
        .take(limits.right_sample)
        .map(|r| (*r, r.chars().count()))
        .filter(|(_, len)| *len >= limits.min_length)
        .collect();

    let mut found = Vec::new();
    for l in left.iter().take(limits.left_sample) {
        let l_len = l.chars().count();
        if l_len < limits.min_length {
            continue;
        }
        for (r, r_len) in &right {
            if l_len.abs_diff(*r_len) > limits.max_distance {
                continue;
            }
            let distance = levenshtein(l, r);
            if distance > 0 && distance <= limits.max_distance {
                found.push(NearMatch {
                    x_value: l.to_string(),
                    y_value: r.to_string(),
                    distance,
                });
            }
        }
    }

    found.sort_by_key(|m| m.distance);
    found.truncate(limits.max_candidates);
    found
}

/// Suggest likely typos between two textual key columns.
pub fn detect_near_matches(x: &Column, y: &Column, limits: &NearMatchLimits) -> Option<Issue> {
    if !x.kind().is_textual() || !y.kind().is_textual() {
        return None;
    }

    let y_distinct = distinct(y);
    let y_set: HashSet<&str> = y_distinct.iter().copied().collect();
    let unmatched: Vec<&str> = distinct(x)
        .into_iter()
        .filter(|v| !y_set.contains(v))
        .collect();

    if unmatched.is_empty() {
        return None;
    }

    let candidates = find_near_matches(&unmatched, &y_distinct, limits);
    if candidates.is_empty() {
        return None;
    }

    Some(Issue::new(
        IssueKind::NearMatch,
        Severity::Info,
        TableSide::Both,
        vec![x.name().to_string(), y.name().to_string()],
        format!(
            "{} unmatched key(s) in x.{} are within {} edit(s) of a key in y.{}",
            candidates.len(),
            x.name(),
            limits.max_distance,
            y.name()
        ),
        IssueDetail::NearMatches { candidates },
    ))
}

fn distinct(column: &Column) -> Vec<&str> {
    let mut seen = HashSet::new();
    column
        .text_values()
        .map(|(_, v)| v)
        .filter(|v| seen.insert(*v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_levenshtein_symmetric_and_reflexive() {
        for (a, b) in [("abc", "abd"), ("customer", "costumer"), ("", "x")] {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
            assert_eq!(levenshtein(a, a), 0);
        }
    }

    #[test]
    fn test_levenshtein_triangle_inequality() {
        let words = ["apple", "apply", "ample", "maple", "app"];
        for a in words {
            for b in words {
                for c in words {
                    assert!(levenshtein(a, c) <= levenshtein(a, b) + levenshtein(b, c));
                }
            }
        }
    }

    #[test]
    fn test_candidates_sorted_and_filtered() {
        let limits = NearMatchLimits::default();
        let found = find_near_matches(&["apple", "ab"], &["apply", "appl", "ab", "zzzzz"], &limits);

        // "ab" is below the minimum length
        assert_eq!(found.len(), 2);
        assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(found[0].y_value, "apply");
        assert_eq!(found[1].y_value, "appl");
    }

    #[test]
    fn test_caps_are_applied() {
        let limits = NearMatchLimits {
            max_candidates: 1,
            ..NearMatchLimits::default()
        };
        let found = find_near_matches(&["abcd"], &["abce", "abcf"], &limits);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].y_value, "abce");

        let limits = NearMatchLimits {
            right_sample: 1,
            ..NearMatchLimits::default()
        };
        let found = find_near_matches(&["abcd"], &["zzzz", "abce"], &limits);
        assert!(found.is_empty());
    }

    #[test]
    fn test_detect_on_columns() {
        let x = Column::text("name", vec![Some("Jonathan"), Some("Maria")]);
        let y = Column::text("name", vec![Some("Jonathon"), Some("Maria")]);
        let issue = detect_near_matches(&x, &y, &NearMatchLimits::default()).unwrap();
        assert_eq!(
            issue.detail,
            IssueDetail::NearMatches {
                candidates: vec![NearMatch {
                    x_value: "Jonathan".to_string(),
                    y_value: "Jonathon".to_string(),
                    distance: 1,
                }]
            }
        );
    }
}
