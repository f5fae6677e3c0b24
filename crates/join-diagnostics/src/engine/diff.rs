use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::table::Table;

/// Missing values in a column that a join introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
}

/// Shape comparison of a table before and after a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDiff {
    pub rows_before: usize,
    pub rows_after: usize,
    pub row_delta: i64,
    pub added_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    /// Added columns that contain missing values, usually from unmatched rows.
    pub missing_in_added: Vec<ColumnMissing>,
}

impl TableDiff {
    pub fn is_unchanged(&self) -> bool {
        self.row_delta == 0 && self.added_columns.is_empty() && self.removed_columns.is_empty()
    }
}

/// Compare `before` with `after`. Column order follows each table.
pub fn diff_tables(before: &Table, after: &Table) -> TableDiff {
    let before_names: HashSet<&str> = before.column_names().into_iter().collect();
    let after_names: HashSet<&str> = after.column_names().into_iter().collect();

    let added_columns: Vec<String> = after
        .column_names()
        .into_iter()
        .filter(|c| !before_names.contains(c))
        .map(str::to_string)
        .collect();
    let removed_columns: Vec<String> = before
        .column_names()
        .into_iter()
        .filter(|c| !after_names.contains(c))
        .map(str::to_string)
        .collect();

    let missing_in_added = added_columns
        .iter()
        .filter_map(|name| after.column(name))
        .map(|col| ColumnMissing {
            column: col.name().to_string(),
            missing_count: col.missing_count(),
        })
        .filter(|m| m.missing_count > 0)
        .collect();

    TableDiff {
        rows_before: before.height(),
        rows_after: after.height(),
        row_delta: after.height() as i64 - before.height() as i64,
        added_columns,
        removed_columns,
        missing_in_added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_diff_after_left_join() {
        let before = Table::new(vec![Column::integer("id", vec![Some(1), Some(2)])]).unwrap();
        let after = Table::new(vec![
            Column::integer("id", vec![Some(1), Some(1), Some(2)]),
            Column::text("name", vec![Some("a"), Some("b"), None]),
        ])
        .unwrap();

        let diff = diff_tables(&before, &after);
        assert_eq!(diff.row_delta, 1);
        assert_eq!(diff.added_columns, vec!["name"]);
        assert!(diff.removed_columns.is_empty());
        assert_eq!(
            diff.missing_in_added,
            vec![ColumnMissing {
                column: "name".to_string(),
                missing_count: 1
            }]
        );
        assert!(!diff.is_unchanged());
    }

    #[test]
    fn test_identical_tables() {
        let t = Table::new(vec![Column::integer("id", vec![Some(1)])]).unwrap();
        assert!(diff_tables(&t, &t).is_unchanged());
    }
}
