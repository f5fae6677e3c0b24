//! Findings derived from key summaries and match results.

use super::{Issue, IssueDetail, IssueKind, MAX_EXAMPLES, Severity};
use crate::analysis::{KeySummary, MatchAnalysis};
use crate::keys::TableSide;

/// Duplicate keys on one side multiply rows in the join.
pub fn duplicate_key_issue(summary: &KeySummary, side: TableSide, columns: &[String]) -> Option<Issue> {
    if !summary.has_duplicates() {
        return None;
    }

    Some(Issue::new(
        IssueKind::DuplicateKeys,
        Severity::Warning,
        side,
        columns.to_vec(),
        format!(
            "{} key(s) in {} occur more than once ({} rows affected)",
            summary.duplicate_key_count, side, summary.duplicate_row_count
        ),
        IssueDetail::Duplicates {
            duplicate_key_count: summary.duplicate_key_count,
            duplicate_row_count: summary.duplicate_row_count,
            examples: summary
                .duplicate_keys
                .iter()
                .take(MAX_EXAMPLES)
                .cloned()
                .collect(),
        },
    ))
}

/// Rows with a missing key component never match anything.
pub fn missing_key_issue(summary: &KeySummary, side: TableSide, columns: &[String]) -> Option<Issue> {
    if summary.na_count == 0 {
        return None;
    }

    Some(Issue::new(
        IssueKind::MissingKeys,
        Severity::Warning,
        side,
        columns.to_vec(),
        format!(
            "{} of {} row(s) in {} have a missing key and will not match",
            summary.na_count, summary.row_count, side
        ),
        IssueDetail::MissingKeys {
            na_count: summary.na_count,
            row_count: summary.row_count,
        },
    ))
}

/// Both sides have keys but none are shared.
pub fn no_match_issue(matches: &MatchAnalysis, columns: &[String]) -> Option<Issue> {
    let x_unique = matches.matched_count + matches.left_only_count;
    let y_unique = matches.matched_count + matches.right_only_count;
    if matches.matched_count > 0 || x_unique == 0 || y_unique == 0 {
        return None;
    }

    Some(Issue::new(
        IssueKind::NoMatches,
        Severity::Error,
        TableSide::Both,
        columns.to_vec(),
        format!(
            "no keys match: {} distinct key(s) in x, {} in y, none shared",
            x_unique, y_unique
        ),
        IssueDetail::NoMatches { x_unique, y_unique },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_matches;
    use crate::keys::{Key, KeyFrequencies};

    fn freq(keys: &[Option<i64>]) -> KeyFrequencies {
        KeyFrequencies::from_keys(keys.iter().map(|k| k.map(Key::from)))
    }

    #[test]
    fn test_duplicate_and_missing_findings() {
        let summary = KeySummary::from_frequencies(&freq(&[Some(1), Some(1), None]));
        let cols = vec!["id".to_string()];

        let dup = duplicate_key_issue(&summary, TableSide::X, &cols).unwrap();
        assert_eq!(dup.kind, IssueKind::DuplicateKeys);
        assert!(dup.message.contains("2 rows"));

        let na = missing_key_issue(&summary, TableSide::X, &cols).unwrap();
        assert_eq!(
            na.detail,
            IssueDetail::MissingKeys {
                na_count: 1,
                row_count: 3
            }
        );
    }

    #[test]
    fn test_clean_summary_has_no_findings() {
        let summary = KeySummary::from_frequencies(&freq(&[Some(1), Some(2)]));
        assert!(duplicate_key_issue(&summary, TableSide::Y, &[]).is_none());
        assert!(missing_key_issue(&summary, TableSide::Y, &[]).is_none());
    }

    #[test]
    fn test_no_match_only_when_both_sides_have_keys() {
        let m = analyze_matches(&freq(&[Some(1)]), &freq(&[Some(2)]));
        assert_eq!(no_match_issue(&m, &[]).unwrap().severity, Severity::Error);

        let m = analyze_matches(&freq(&[]), &freq(&[Some(2)]));
        assert!(no_match_issue(&m, &[]).is_none());

        let m = analyze_matches(&freq(&[Some(2)]), &freq(&[Some(2)]));
        assert!(no_match_issue(&m, &[]).is_none());
    }
}
