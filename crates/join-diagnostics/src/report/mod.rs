//! The join report and its presentation layers.
//!
//! [`JoinReport`] is built once per analysis and never mutated afterwards.
//! Everything in this module only reads it:
//!
//! - [`render`] formats it as text, markdown, a flat data table or JSON
//! - [`ReportWriter`] persists it as a timestamped JSON audit record
//! - [`LastReport`] keeps the most recent report for interactive callers
//!
//! # Example
//!
//! ```rust,ignore
//! use join_diagnostics::{analyze, AnalysisOptions, KeySpec};
//! use join_diagnostics::report::{render, ReportFormat, ReportWriter};
//!
//! let report = analyze(&orders, &customers, &KeySpec::shared(["customer_id"]), &AnalysisOptions::default())?;
//! println!("{}", render(&report, ReportFormat::Markdown)?);
//!
//! let writer = ReportWriter::new(PathBuf::from("reports"));
//! writer.write_report_to_file(&report, "orders_customers")?;
//! ```

mod cache;
mod render;
mod writer;

pub use cache::LastReport;
pub use render::{ReportFormat, format_rate, render};
pub use writer::{ReportRecord, ReportWriter};

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use crate::analysis::{
    Cardinality, CartesianRisk, ExpectedRowCounts, KeySummary, MatchAnalysis, MultiColumnBreakdown,
};
use crate::issues::{Issue, IssueKind, Severity};
use crate::keys::KeySpec;

/// How the inputs were sampled before analysis.
///
/// Counts and predictions in a sampled report describe the sample. They
/// are estimates for the full tables and are not scaled up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingInfo {
    pub sample_size: usize,
    pub seed: u64,
    pub x_original_rows: u64,
    pub y_original_rows: u64,
    pub x_sampled_rows: u64,
    pub y_sampled_rows: u64,
}

impl SamplingInfo {
    /// Whether either table was actually reduced.
    pub fn is_estimate(&self) -> bool {
        self.x_sampled_rows < self.x_original_rows || self.y_sampled_rows < self.y_original_rows
    }
}

/// Everything learned about a prospective join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinReport {
    pub key_spec: KeySpec,
    pub x_summary: KeySummary,
    pub y_summary: KeySummary,
    pub match_analysis: MatchAnalysis,
    /// `None` only if a predicted count overflows 64 bits.
    pub expected_rows: Option<ExpectedRowCounts>,
    pub cardinality: Cardinality,
    pub issues: Vec<Issue>,
    pub cartesian_risk: Option<CartesianRisk>,
    /// Present for composite keys.
    pub breakdown: Option<MultiColumnBreakdown>,
    pub sampling: Option<SamplingInfo>,
}

assert_impl_all!(JoinReport: Send, Sync);

impl JoinReport {
    /// Issues of one kind, in report order.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> + '_ {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Highest severity among the issues.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// Whether any warning- or error-level issue was found.
    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(Issue::is_blocking)
    }

    /// Whether the Cartesian check flagged an explosion.
    pub fn is_cartesian_risk(&self) -> bool {
        self.cartesian_risk.as_ref().is_some_and(|r| r.at_risk)
    }

    /// Whether the counts describe a sample rather than the full tables.
    pub fn is_estimate(&self) -> bool {
        self.sampling.as_ref().is_some_and(SamplingInfo::is_estimate)
    }
}
