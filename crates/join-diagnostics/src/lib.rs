//! Join Diagnostics Library
//!
//! Explains what a relational join between two tables will do before it is
//! run: how keys overlap, how many rows each join type produces, which
//! relationship the keys imply and which data problems keep rows from
//! matching.
//!
//! # Overview
//!
//! - **Key summaries**: row, unique, duplicate and missing-key counts per table
//! - **Match analysis**: matched, x-only and y-only keys with a match rate
//! - **Row-count prediction**: exact inner/left/right/full result sizes
//! - **Cardinality**: `1:1`, `1:m`, `m:1` or `m:m`, plus strict enforcement
//! - **Issue detection**: whitespace, case, invisible characters, encodings,
//!   empty strings, type and factor-level mismatches, numeric precision and
//!   near-match (edit distance) suggestions
//! - **Cartesian risk**: expansion factor and the worst offending keys
//! - **Repair**: trim, case-fold, strip invisible characters, empty to missing
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use join_diagnostics::{analyze, AnalysisOptions, KeySpec, Table};
//! use join_diagnostics::report::{render, ReportFormat};
//! use polars::prelude::*;
//!
//! let orders = Table::from_dataframe(&CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("orders.csv".into()))?
//!     .finish()?)?;
//! let customers = Table::from_dataframe(&customers_df)?;
//!
//! let report = analyze(
//!     &orders,
//!     &customers,
//!     &KeySpec::parse("customer_id=id")?,
//!     &AnalysisOptions::default(),
//! )?;
//!
//! println!("{}", render(&report, ReportFormat::Text)?);
//! if let Some(rows) = report.expected_rows {
//!     println!("left join will return {} rows", rows.left);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisOptions`] to tune sampling, near-match search and the
//! Cartesian threshold:
//!
//! ```rust,ignore
//! let options = AnalysisOptions::builder()
//!     .sample_size(100_000)
//!     .sample_seed(42)
//!     .near_match_max_distance(1)
//!     .cartesian_threshold(5.0)
//!     .build()?;
//! ```
//!
//! # Strict joins
//!
//! ```rust,ignore
//! use join_diagnostics::{enforce_cardinality, Cardinality};
//!
//! enforce_cardinality(Cardinality::ManyToOne, &report)?; // y keys must be unique
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod issues;
pub mod keys;
pub mod repair;
pub mod report;
pub mod strict;
pub mod table;

// Re-exports for convenient access
pub use analysis::{
    Cardinality, CartesianRisk, ExpectedRowCounts, JoinType, KeySummary, MatchAnalysis,
    MultiColumnBreakdown,
};
pub use config::{AnalysisOptions, AnalysisOptionsBuilder, ConfigValidationError};
pub use engine::{
    JoinAnalyzer, JoinAnalyzerBuilder, JoinExplanation, KeyCheck, TableDiff, analyze, diff_tables,
    explain, key_check,
};
pub use error::{DiagnosticError, Result as DiagnosticResult, ResultExt};
pub use issues::{Issue, IssueDetail, IssueKind, Severity};
pub use keys::{Key, KeyPart, KeySpec, TableSide};
pub use report::{JoinReport, ReportFormat, SamplingInfo};
pub use strict::enforce_cardinality;
pub use table::{Column, ColumnKind, Table, Value};
