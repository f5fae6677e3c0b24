//! Orchestration of a full join analysis.
//!
//! [`analyze`] validates the key specification against both tables once,
//! optionally samples rows, then runs every analysis and detector and
//! assembles a [`JoinReport`](crate::report::JoinReport). The other entry
//! points build on it:
//!
//! - [`key_check`] reduces a report to pass/fail
//! - [`explain`] accounts for the size of an actual or prospective join
//! - [`diff_tables`] compares a table before and after a join

mod analyzer;
mod check;
mod diff;
mod explain;

pub use analyzer::{JoinAnalyzer, JoinAnalyzerBuilder, analyze};
pub use check::{KeyCheck, key_check};
pub use diff::{ColumnMissing, TableDiff, diff_tables};
pub use explain::{ExplanationReason, JoinExplanation, explain};
