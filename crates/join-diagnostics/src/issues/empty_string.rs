use super::{Issue, IssueDetail, IssueKind, Severity};
use crate::keys::TableSide;
use crate::table::Column;

/// Flag non-missing empty strings. Empty strings match each other but
/// never match a missing value.
pub fn detect_empty_strings(column: &Column, side: TableSide) -> Option<Issue> {
    if !column.kind().is_textual() {
        return None;
    }

    let indices: Vec<usize> = column
        .text_values()
        .filter(|(_, v)| v.is_empty())
        .map(|(idx, _)| idx)
        .collect();

    if indices.is_empty() {
        return None;
    }

    Some(Issue::new(
        IssueKind::EmptyString,
        Severity::Warning,
        side,
        vec![column.name().to_string()],
        format!(
            "{} empty string(s) in {}.{} will match each other but not missing values",
            indices.len(),
            side,
            column.name()
        ),
        IssueDetail::EmptyString { indices },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_found() {
        let col = Column::text("id", vec![Some(""), None, Some("a"), Some("")]);
        let issue = detect_empty_strings(&col, TableSide::X).unwrap();
        assert_eq!(issue.detail, IssueDetail::EmptyString { indices: vec![0, 3] });
    }

    #[test]
    fn test_missing_is_not_empty() {
        let col = Column::text("id", vec![None::<&str>, Some(" ")]);
        assert!(detect_empty_strings(&col, TableSide::X).is_none());
    }
}
