use std::collections::HashSet;

use super::{Issue, IssueDetail, IssueKind, Severity};
use crate::keys::TableSide;
use crate::table::{Column, ColumnKind};

/// Symmetric difference of the category levels of two categorical columns.
///
/// Levels present in x but not in y are a warning: rows carrying them can
/// never match. Extra levels on the y side alone are informational.
pub fn detect_factor_level_mismatch(x: &Column, y: &Column) -> Option<Issue> {
    let (ColumnKind::Categorical { levels: x_levels }, ColumnKind::Categorical { levels: y_levels }) =
        (x.kind(), y.kind())
    else {
        return None;
    };

    let x_set: HashSet<&str> = x_levels.iter().map(String::as_str).collect();
    let y_set: HashSet<&str> = y_levels.iter().map(String::as_str).collect();

    let x_only: Vec<String> = x_levels
        .iter()
        .filter(|l| !y_set.contains(l.as_str()))
        .cloned()
        .collect();
    let y_only: Vec<String> = y_levels
        .iter()
        .filter(|l| !x_set.contains(l.as_str()))
        .cloned()
        .collect();

    if x_only.is_empty() && y_only.is_empty() {
        return None;
    }

    let severity = if x_only.is_empty() {
        Severity::Info
    } else {
        Severity::Warning
    };

    Some(Issue::new(
        IssueKind::FactorLevels,
        severity,
        TableSide::Both,
        vec![x.name().to_string(), y.name().to_string()],
        format!(
            "factor levels differ: {} only in x.{}, {} only in y.{}",
            x_only.len(),
            x.name(),
            y_only.len(),
            y.name()
        ),
        IssueDetail::FactorLevels {
            x_only_count: x_only.len(),
            y_only_count: y_only.len(),
            x_only,
            y_only,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_levels_unique_to_each_side() {
        let x = Column::categorical("region", levels(&["n", "s", "e"]), vec![Some("n")]).unwrap();
        let y = Column::categorical("region", levels(&["n", "s", "w"]), vec![Some("s")]).unwrap();

        let issue = detect_factor_level_mismatch(&x, &y).unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(
            issue.detail,
            IssueDetail::FactorLevels {
                x_only: vec!["e".to_string()],
                y_only: vec!["w".to_string()],
                x_only_count: 1,
                y_only_count: 1,
            }
        );
    }

    #[test]
    fn test_y_superset_is_info() {
        let x = Column::categorical("r", levels(&["a"]), vec![Some("a")]).unwrap();
        let y = Column::categorical("r", levels(&["a", "b"]), vec![Some("a")]).unwrap();
        assert_eq!(
            detect_factor_level_mismatch(&x, &y).unwrap().severity,
            Severity::Info
        );
    }

    #[test]
    fn test_same_levels_or_non_categorical() {
        let x = Column::categorical("r", levels(&["a", "b"]), vec![Some("a")]).unwrap();
        let y = Column::categorical("r", levels(&["b", "a"]), vec![Some("b")]).unwrap();
        assert!(detect_factor_level_mismatch(&x, &y).is_none());

        let t = Column::text("r", vec![Some("a")]);
        assert!(detect_factor_level_mismatch(&x, &t).is_none());
    }
}
