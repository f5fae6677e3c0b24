use serde::{Deserialize, Serialize};
use tracing::info;

use super::analyze;
use crate::config::AnalysisOptions;
use crate::error::Result;
use crate::issues::Issue;
use crate::keys::KeySpec;
use crate::table::Table;

/// Pass/fail verdict on a pair of key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCheck {
    /// No warning- or error-level issue was found.
    pub passed: bool,
    /// The warning- and error-level issues, in report order.
    pub blocking: Vec<Issue>,
    /// Informational findings that do not fail the check.
    pub informational: Vec<Issue>,
}

impl KeyCheck {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let (blocking, informational): (Vec<Issue>, Vec<Issue>) =
            issues.iter().cloned().partition(Issue::is_blocking);
        Self {
            passed: blocking.is_empty(),
            blocking,
            informational,
        }
    }
}

/// Quick check that `x` and `y` can be joined on `key_spec` cleanly.
pub fn key_check(
    x: &Table,
    y: &Table,
    key_spec: &KeySpec,
    options: &AnalysisOptions,
) -> Result<KeyCheck> {
    let report = analyze(x, y, key_spec, options)?;
    let check = KeyCheck::from_issues(&report.issues);
    info!(
        "Key check by {}: {} ({} blocking issue(s))",
        key_spec,
        if check.passed { "passed" } else { "failed" },
        check.blocking.len()
    );
    Ok(check)
}
