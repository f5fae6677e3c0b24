use super::{Issue, IssueDetail, IssueKind, Severity};
use crate::keys::{MAX_EXACT_F64_INT, TableSide};
use crate::table::{Column, ColumnKind, Value};

// Integers are compared in integer arithmetic; 2^53 + 1 rounds to 2^53 as a float.
fn beyond_exact_range(column: &Column) -> bool {
    column.values().iter().any(|value| match value {
        Value::Integer(i) => i.unsigned_abs() > 1u64 << 53,
        Value::Float(f) => f.is_finite() && f.abs() > MAX_EXACT_F64_INT,
        _ => false,
    })
}

/// Compare the kinds of two key columns.
///
/// Text against categorical is coerced and informational. Numeric against
/// text, or boolean against anything else, is a comparison risk. Integer
/// against float is only reported when a magnitude exceeds 2^53, where the
/// float side can no longer hold the integer exactly.
pub fn detect_type_mismatch(x: &Column, y: &Column) -> Option<Issue> {
    let (xk, yk) = (x.kind(), y.kind());

    let (severity, message) = match (xk, yk) {
        (ColumnKind::Text, ColumnKind::Categorical { .. })
        | (ColumnKind::Categorical { .. }, ColumnKind::Text) => (
            Severity::Info,
            format!(
                "x.{} is {} and y.{} is {}; values are compared as text",
                x.name(),
                xk.name(),
                y.name(),
                yk.name()
            ),
        ),
        (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
            if !beyond_exact_range(x) && !beyond_exact_range(y) {
                return None;
            }
            (
                Severity::Warning,
                format!(
                    "x.{} ({}) and y.{} ({}) hold values beyond 2^53; integer keys may lose precision",
                    x.name(),
                    xk.name(),
                    y.name(),
                    yk.name()
                ),
            )
        }
        (a, b) if a.name() == b.name() || (a.is_textual() && b.is_textual()) => return None,
        (a, b) => (
            Severity::Warning,
            format!(
                "x.{} is {} but y.{} is {}; keys of different types never match",
                x.name(),
                a.name(),
                y.name(),
                b.name()
            ),
        ),
    };

    Some(Issue::new(
        IssueKind::TypeMismatch,
        severity,
        TableSide::Both,
        vec![x.name().to_string(), y.name().to_string()],
        message,
        IssueDetail::TypeMismatch {
            x_kind: xk.name().to_string(),
            y_kind: yk.name().to_string(),
        },
    ))
}
