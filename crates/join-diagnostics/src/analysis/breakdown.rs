//! Per-column attribution for composite keys.

use serde::{Deserialize, Serialize};

use super::matching::analyze_matches;
use crate::error::{DiagnosticError, Result};
use crate::keys::{TableSide, derive_keys};
use crate::table::Table;

/// Match statistics of one key column considered on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub x_column: String,
    pub y_column: String,
    pub matched_count: u64,
    pub left_only_count: u64,
    pub right_only_count: u64,
    pub match_rate: Option<f64>,
}

/// Which column of a composite key loses the most matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiColumnBreakdown {
    pub columns: Vec<ColumnMatch>,
    /// x-side name of the column with the lowest defined match rate.
    /// Ties go to the earlier column; `None` if no rate is defined.
    pub problem_column: Option<String>,
}

impl MultiColumnBreakdown {
    pub fn problem(&self) -> Option<&ColumnMatch> {
        let name = self.problem_column.as_deref()?;
        self.columns.iter().find(|c| c.x_column == name)
    }
}

/// Break a composite key down into per-column match rates.
///
/// Requires at least two column pairs.
pub fn breakdown_columns(
    x: &Table,
    y: &Table,
    pairs: &[(String, String)],
) -> Result<MultiColumnBreakdown> {
    if pairs.len() < 2 {
        return Err(DiagnosticError::InvalidInput(
            "a column breakdown needs at least two key columns".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(pairs.len());
    for (x_col, y_col) in pairs {
        let x_freq = derive_keys(x, std::slice::from_ref(x_col), TableSide::X)?.frequencies();
        let y_freq = derive_keys(y, std::slice::from_ref(y_col), TableSide::Y)?.frequencies();
        let m = analyze_matches(&x_freq, &y_freq);

        columns.push(ColumnMatch {
            x_column: x_col.clone(),
            y_column: y_col.clone(),
            matched_count: m.matched_count,
            left_only_count: m.left_only_count,
            right_only_count: m.right_only_count,
            match_rate: m.match_rate,
        });
    }

    let mut problem: Option<(&ColumnMatch, f64)> = None;
    for col in &columns {
        if let Some(rate) = col.match_rate {
            // strict comparison keeps the first column on ties
            if problem.is_none_or(|(_, best)| rate < best) {
                problem = Some((col, rate));
            }
        }
    }
    let problem_column = problem.map(|(col, _)| col.x_column.clone());

    Ok(MultiColumnBreakdown {
        columns,
        problem_column,
    })
}
