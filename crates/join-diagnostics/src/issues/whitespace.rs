use once_cell::sync::Lazy;
use regex::Regex;

use super::{Issue, IssueDetail, IssueKind, Severity, distinct_examples};
use crate::keys::TableSide;
use crate::table::Column;

static LEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s").expect("Invalid regex: leading whitespace"));
static TRAILING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s$").expect("Invalid regex: trailing whitespace"));

/// Flag text values with leading or trailing whitespace.
pub fn detect_whitespace(column: &Column, side: TableSide) -> Option<Issue> {
    if !column.kind().is_textual() {
        return None;
    }

    let mut indices = Vec::new();
    let mut affected = Vec::new();
    let (mut leading, mut trailing) = (0, 0);

    for (idx, value) in column.text_values() {
        let lead = LEADING.is_match(value);
        let trail = TRAILING.is_match(value);
        if lead || trail {
            indices.push(idx);
            affected.push(value);
            leading += usize::from(lead);
            trailing += usize::from(trail);
        }
    }

    if indices.is_empty() {
        return None;
    }

    Some(Issue::new(
        IssueKind::Whitespace,
        Severity::Warning,
        side,
        vec![column.name().to_string()],
        format!(
            "{} value(s) in {}.{} have leading or trailing whitespace",
            indices.len(),
            side,
            column.name()
        ),
        IssueDetail::Whitespace {
            indices,
            affected_values: distinct_examples(affected),
            leading,
            trailing,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_and_trailing_flagged() {
        let col = Column::text("id", vec![Some("A "), Some(" B"), Some("C")]);
        let issue = detect_whitespace(&col, TableSide::X).unwrap();

        match issue.detail {
            IssueDetail::Whitespace {
                indices,
                affected_values,
                leading,
                trailing,
            } => {
                assert_eq!(indices, vec![0, 1]);
                assert_eq!(affected_values, vec!["A ", " B"]);
                assert_eq!((leading, trailing), (1, 1));
            }
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn test_tabs_and_missing() {
        let col = Column::text("id", vec![Some("\tA"), None, Some("B")]);
        let issue = detect_whitespace(&col, TableSide::Y).unwrap();
        assert!(matches!(issue.detail, IssueDetail::Whitespace { ref indices, .. } if indices == &[0]));
    }

    #[test]
    fn test_inapplicable_to_numeric() {
        let col = Column::integer("id", vec![Some(1)]);
        assert!(detect_whitespace(&col, TableSide::X).is_none());
    }

    #[test]
    fn test_clean_text_has_no_issue() {
        let col = Column::text("id", vec![Some("a b"), Some("c")]);
        assert!(detect_whitespace(&col, TableSide::X).is_none());
    }
}
