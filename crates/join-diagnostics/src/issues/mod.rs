//! Key quality issue detection.
//!
//! Every detector is a pure function over one or two columns and never
//! fails: a detector handed a column kind it does not apply to (whitespace
//! on an integer column, factor levels on text) simply finds nothing.
//! Column existence is checked once by the orchestrator before any detector
//! runs.
//!
//! [`detect_column_pair`] runs the applicable detectors for one key column
//! pair in a fixed order so reports are reproducible.

mod case;
mod empty_string;
mod encoding;
mod factor_levels;
mod keys;
mod near_match;
mod precision;
mod type_mismatch;
mod whitespace;

pub use case::detect_case_mismatch;
pub use empty_string::detect_empty_strings;
pub use encoding::{detect_invisible_characters, detect_mixed_encoding};
pub use factor_levels::detect_factor_level_mismatch;
pub use keys::{duplicate_key_issue, missing_key_issue, no_match_issue};
pub use near_match::{NearMatchLimits, detect_near_matches, find_near_matches, levenshtein};
pub use precision::detect_numeric_precision;
pub use type_mismatch::detect_type_mismatch;
pub use whitespace::detect_whitespace;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AnalysisOptions;
use crate::keys::{Key, TableSide};
use crate::table::Column;

/// Maximum number of example values carried in an issue.
pub const MAX_EXAMPLES: usize = 10;

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateKeys,
    MissingKeys,
    NoMatches,
    Whitespace,
    CaseMismatch,
    InvisibleCharacters,
    MixedEncoding,
    EmptyString,
    TypeMismatch,
    FactorLevels,
    NumericPrecision,
    NearMatch,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::DuplicateKeys => "duplicate_keys",
            IssueKind::MissingKeys => "missing_keys",
            IssueKind::NoMatches => "no_matches",
            IssueKind::Whitespace => "whitespace",
            IssueKind::CaseMismatch => "case_mismatch",
            IssueKind::InvisibleCharacters => "invisible_characters",
            IssueKind::MixedEncoding => "mixed_encoding",
            IssueKind::EmptyString => "empty_string",
            IssueKind::TypeMismatch => "type_mismatch",
            IssueKind::FactorLevels => "factor_levels",
            IssueKind::NumericPrecision => "numeric_precision",
            IssueKind::NearMatch => "near_match",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How serious a finding is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A case-insensitive match between an x value and a y value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePair {
    pub x_value: String,
    pub y_value: String,
}

/// A pair of keys within the edit distance threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMatch {
    pub x_value: String,
    pub y_value: String,
    pub distance: usize,
}

/// Structured payload of an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueDetail {
    Duplicates {
        duplicate_key_count: u64,
        duplicate_row_count: u64,
        examples: Vec<Key>,
    },
    MissingKeys {
        na_count: u64,
        row_count: u64,
    },
    NoMatches {
        x_unique: u64,
        y_unique: u64,
    },
    Whitespace {
        indices: Vec<usize>,
        affected_values: Vec<String>,
        leading: usize,
        trailing: usize,
    },
    CaseMismatch {
        pairs: Vec<CasePair>,
    },
    InvisibleCharacters {
        indices: Vec<usize>,
        affected_values: Vec<String>,
        /// Offending code points as `U+XXXX`.
        code_points: Vec<String>,
    },
    MixedEncoding {
        indices: Vec<usize>,
        examples: Vec<String>,
    },
    EmptyString {
        indices: Vec<usize>,
    },
    TypeMismatch {
        x_kind: String,
        y_kind: String,
    },
    FactorLevels {
        x_only: Vec<String>,
        y_only: Vec<String>,
        x_only_count: usize,
        y_only_count: usize,
    },
    Precision {
        count: usize,
        examples: Vec<f64>,
    },
    NearMatches {
        candidates: Vec<NearMatch>,
    },
}

/// A single finding. Issues describe the data; they never change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub table: TableSide,
    pub columns: Vec<String>,
    pub message: String,
    pub detail: IssueDetail,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        table: TableSide,
        columns: Vec<String>,
        message: impl Into<String>,
        detail: IssueDetail,
    ) -> Self {
        Self {
            kind,
            severity,
            table,
            columns,
            message: message.into(),
            detail,
        }
    }

    /// Warning or error.
    pub fn is_blocking(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

/// Run every applicable detector over one key column pair.
///
/// Single-column detectors run on x then y; pairwise detectors follow.
pub fn detect_column_pair(x: &Column, y: &Column, options: &AnalysisOptions) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (column, side) in [(x, TableSide::X), (y, TableSide::Y)] {
        issues.extend(detect_whitespace(column, side));
        issues.extend(detect_invisible_characters(column, side));
        issues.extend(detect_mixed_encoding(column, side));
        issues.extend(detect_empty_strings(column, side));
        issues.extend(detect_numeric_precision(column, side));
    }

    issues.extend(detect_type_mismatch(x, y));
    issues.extend(detect_factor_level_mismatch(x, y));
    issues.extend(detect_case_mismatch(x, y));
    issues.extend(detect_near_matches(x, y, &NearMatchLimits::from(options)));

    issues
}

/// Distinct strings in first-seen order, capped at [`MAX_EXAMPLES`].
pub(crate) fn distinct_examples<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .take(MAX_EXAMPLES)
        .map(str::to_string)
        .collect()
}
