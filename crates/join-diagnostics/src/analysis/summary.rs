//! Per-table key summaries.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::{Key, KeyFrequencies, TableSide, derive_keys};
use crate::table::Table;

/// Key statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySummary {
    /// Rows in the table, including rows with NA keys.
    pub row_count: u64,
    /// Distinct present keys.
    pub unique_count: u64,
    /// Distinct keys occurring more than once.
    pub duplicate_key_count: u64,
    /// Rows carrying a duplicated key (sum of their occurrence counts).
    pub duplicate_row_count: u64,
    /// Rows whose key has a missing component.
    pub na_count: u64,
    /// The duplicated keys, in first-seen order.
    pub duplicate_keys: Vec<Key>,
}

impl KeySummary {
    /// Summarize already-derived key frequencies.
    pub fn from_frequencies(freq: &KeyFrequencies) -> Self {
        let mut duplicate_keys = Vec::new();
        let mut duplicate_row_count = 0;

        for (key, count) in freq.iter() {
            if count > 1 {
                duplicate_keys.push(key.clone());
                duplicate_row_count += count;
            }
        }

        Self {
            row_count: freq.row_count(),
            unique_count: freq.unique_count() as u64,
            duplicate_key_count: duplicate_keys.len() as u64,
            duplicate_row_count,
            na_count: freq.na_count(),
            duplicate_keys,
        }
    }

    /// Whether any key occurs more than once.
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_key_count > 0
    }
}

/// Summarize the keys of `table` over `columns`.
pub fn summarize_keys(table: &Table, columns: &[String], side: TableSide) -> Result<KeySummary> {
    let keys = derive_keys(table, columns, side)?;
    Ok(KeySummary::from_frequencies(&keys.frequencies()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_summary_counts_duplicates_and_na() {
        let table = Table::new(vec![Column::integer(
            "id",
            vec![Some(1), Some(2), Some(2), Some(3), Some(3), Some(3), None],
        )])
        .unwrap();

        let summary = summarize_keys(&table, &["id".to_string()], TableSide::X).unwrap();
        assert_eq!(summary.row_count, 7);
        assert_eq!(summary.unique_count, 3);
        assert_eq!(summary.duplicate_key_count, 2);
        assert_eq!(summary.duplicate_row_count, 5);
        assert_eq!(summary.na_count, 1);
        assert_eq!(summary.duplicate_keys, vec![Key::from(2), Key::from(3)]);
        assert!(summary.unique_count + summary.na_count <= summary.row_count);
    }

    #[test]
    fn test_empty_table_summary_is_all_zero() {
        let table = Table::new(vec![Column::integer("id", Vec::<Option<i64>>::new())]).unwrap();
        let summary = summarize_keys(&table, &["id".to_string()], TableSide::X).unwrap();
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.unique_count, 0);
        assert_eq!(summary.duplicate_row_count, 0);
        assert!(!summary.has_duplicates());
    }
}
