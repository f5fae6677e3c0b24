//! Core key analysis.
//!
//! Every function here is a pure, deterministic computation over
//! [`KeyFrequencies`](crate::keys::KeyFrequencies) or table columns:
//!
//! - [`KeySummary`] - row/unique/duplicate/NA counts for one side
//! - [`MatchAnalysis`] - set overlap between the two key sets
//! - [`ExpectedRowCounts`] - predicted inner/left/right/full join sizes
//! - [`Cardinality`] - 1:1, 1:m, m:1 or m:m classification
//! - [`CartesianRisk`] - duplicate-multiplication blow-up estimate
//! - [`MultiColumnBreakdown`] - per-column attribution for composite keys

mod breakdown;
mod cardinality;
mod cartesian;
mod matching;
mod row_counts;
mod summary;

pub use breakdown::{ColumnMatch, MultiColumnBreakdown, breakdown_columns};
pub use cardinality::{Cardinality, check_cardinality};
pub use cartesian::{CartesianRisk, KeyExpansion, estimate_cartesian_risk};
pub use matching::{MatchAnalysis, analyze_matches};
pub use row_counts::{ExpectedRowCounts, JoinType, predict_row_counts};
pub use summary::{KeySummary, summarize_keys};
