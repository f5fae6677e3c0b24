use super::{Issue, IssueDetail, IssueKind, MAX_EXAMPLES, Severity};
use crate::keys::{MAX_EXACT_F64_INT, TableSide};
use crate::table::{Column, ColumnKind, Value};

/// Flag float key values that may not compare exactly.
///
/// Non-integral values are informational. Magnitudes beyond 2^53 are a
/// separate warning since neighbouring integers collapse to one float.
pub fn detect_numeric_precision(column: &Column, side: TableSide) -> Vec<Issue> {
    if column.kind() != &ColumnKind::Float {
        return Vec::new();
    }

    // Infinities are exact and would read as non-integral through `fract`.
    let floats: Vec<f64> = column
        .values()
        .iter()
        .filter_map(Value::as_f64)
        .filter(|v| v.is_finite())
        .collect();
    let fractional: Vec<f64> = floats.iter().copied().filter(|v| v.fract() != 0.0).collect();
    let huge: Vec<f64> = floats
        .iter()
        .copied()
        .filter(|v| v.abs() > MAX_EXACT_F64_INT)
        .collect();

    let mut issues = Vec::new();
    let columns = vec![column.name().to_string()];

    if !fractional.is_empty() {
        issues.push(Issue::new(
            IssueKind::NumericPrecision,
            Severity::Info,
            side,
            columns.clone(),
            format!(
                "{} non-integral value(s) in {}.{} may not match exactly",
                fractional.len(),
                side,
                column.name()
            ),
            IssueDetail::Precision {
                count: fractional.len(),
                examples: fractional.into_iter().take(MAX_EXAMPLES).collect(),
            },
        ));
    }

    if !huge.is_empty() {
        issues.push(Issue::new(
            IssueKind::NumericPrecision,
            Severity::Warning,
            side,
            columns,
            format!(
                "{} value(s) in {}.{} exceed 2^53 and cannot be represented exactly",
                huge.len(),
                side,
                column.name()
            ),
            IssueDetail::Precision {
                count: huge.len(),
                examples: huge.into_iter().take(MAX_EXAMPLES).collect(),
            },
        ));
    }

    issues
}
