//! Strict join contracts.
//!
//! A caller about to execute a join can declare the relationship it expects
//! and refuse to proceed when the keys break it. The join itself happens
//! elsewhere; this module only decides.

use tracing::{info, warn};

use crate::analysis::{Cardinality, check_cardinality};
use crate::error::Result;
use crate::report::JoinReport;

/// Check the keys described by `report` against `expected`.
///
/// `1:m` requires unique x keys, `m:1` unique y keys, `1:1` both, and
/// `m:m` always passes.
///
/// # Errors
///
/// [`DiagnosticError::CardinalityViolation`](crate::DiagnosticError::CardinalityViolation)
/// naming the expected and the actual relationship.
pub fn enforce_cardinality(expected: Cardinality, report: &JoinReport) -> Result<()> {
    let result = check_cardinality(
        expected,
        report.x_summary.duplicate_key_count > 0,
        report.y_summary.duplicate_key_count > 0,
    );
    match &result {
        Ok(()) => info!(
            "Join by {} satisfies {} (actual {})",
            report.key_spec, expected, report.cardinality
        ),
        Err(e) => warn!("Strict join by {} rejected: {}", report.key_spec, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;
    use crate::engine::analyze;
    use crate::error::DiagnosticError;
    use crate::keys::KeySpec;
    use crate::table::{Column, Table};

    fn report(x: &[i64], y: &[i64]) -> JoinReport {
        let table = |v: &[i64]| {
            Table::new(vec![Column::integer("id", v.iter().map(|&i| Some(i)))]).unwrap()
        };
        analyze(&table(x), &table(y), &KeySpec::shared(["id"]), &AnalysisOptions::default())
            .unwrap()
    }

    #[test]
    fn test_one_to_many_allows_y_duplicates() {
        let r = report(&[1, 2], &[1, 1, 2]);
        assert!(enforce_cardinality(Cardinality::OneToMany, &r).is_ok());
        assert!(enforce_cardinality(Cardinality::ManyToMany, &r).is_ok());
    }

    #[test]
    fn test_violation_names_expected_and_actual() {
        let r = report(&[1, 1, 2], &[1, 2]);
        match enforce_cardinality(Cardinality::OneToMany, &r) {
            Err(DiagnosticError::CardinalityViolation { expected, actual }) => {
                assert_eq!(expected, "1:m");
                assert_eq!(actual, "m:1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(enforce_cardinality(Cardinality::ManyToOne, &r).is_ok());
        assert!(enforce_cardinality(Cardinality::OneToOne, &r).is_err());
    }
}
