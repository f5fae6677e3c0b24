//! Key column repair.
//!
//! Repairs work on raw tables, independently of any report: they return a
//! new table and leave the input untouched. Re-run
//! [`analyze`](crate::analyze) on the result to confirm the fix.
//!
//! Only text and categorical columns are changed. Other kinds pass through
//! with zero counts.
//!
//! # Example
//!
//! ```rust,ignore
//! use join_diagnostics::repair::{repair_columns, suggest_repairs, RepairOptions};
//!
//! let suggestions = suggest_repairs(&report);
//! let options = RepairOptions::from_suggestions(&suggestions, TableSide::X);
//! let (fixed, summary) = repair_columns(&orders, &["customer_id".to_string()], &options)?;
//! println!("{} values changed", summary.total_changed());
//! ```

mod sanitizers;
mod suggest;

pub use suggest::{RepairAction, RepairSuggestion, suggest_repairs};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{DiagnosticError, Result};
use crate::keys::TableSide;
use crate::table::{Column, ColumnKind, Table, Value};
use sanitizers::{ValueChanges, repair_value};

/// Target case for case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Lower,
    Upper,
}

/// Which repairs to apply. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOptions {
    pub trim_whitespace: bool,
    pub remove_invisible: bool,
    pub case: Option<CaseMode>,
    pub empty_to_missing: bool,
}

impl RepairOptions {
    pub fn builder() -> RepairOptionsBuilder {
        RepairOptionsBuilder::default()
    }

    /// Every repair, folding to lowercase.
    pub fn all() -> Self {
        Self {
            trim_whitespace: true,
            remove_invisible: true,
            case: Some(CaseMode::Lower),
            empty_to_missing: true,
        }
    }

    /// Enable the repairs named by `suggestions` that apply to `side`.
    pub fn from_suggestions(suggestions: &[RepairSuggestion], side: TableSide) -> Self {
        let mut options = Self::default();
        for s in suggestions.iter().filter(|s| s.applies_to(side)) {
            match s.action {
                RepairAction::TrimWhitespace => options.trim_whitespace = true,
                RepairAction::RemoveInvisible => options.remove_invisible = true,
                RepairAction::FoldCase(mode) => options.case = Some(mode),
                RepairAction::EmptyToMissing => options.empty_to_missing = true,
            }
        }
        options
    }

    pub fn is_noop(&self) -> bool {
        !self.trim_whitespace && !self.remove_invisible && self.case.is_none() && !self.empty_to_missing
    }
}

/// Builder for [`RepairOptions`].
#[derive(Debug, Default)]
pub struct RepairOptionsBuilder {
    trim_whitespace: Option<bool>,
    remove_invisible: Option<bool>,
    case: Option<CaseMode>,
    empty_to_missing: Option<bool>,
}

impl RepairOptionsBuilder {
    pub fn trim_whitespace(mut self, enabled: bool) -> Self {
        self.trim_whitespace = Some(enabled);
        self
    }

    pub fn remove_invisible(mut self, enabled: bool) -> Self {
        self.remove_invisible = Some(enabled);
        self
    }

    pub fn case(mut self, mode: CaseMode) -> Self {
        self.case = Some(mode);
        self
    }

    pub fn empty_to_missing(mut self, enabled: bool) -> Self {
        self.empty_to_missing = Some(enabled);
        self
    }

    pub fn build(self) -> RepairOptions {
        RepairOptions {
            trim_whitespace: self.trim_whitespace.unwrap_or(false),
            remove_invisible: self.remove_invisible.unwrap_or(false),
            case: self.case,
            empty_to_missing: self.empty_to_missing.unwrap_or(false),
        }
    }
}

/// Changes made to one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRepair {
    pub column: String,
    pub trimmed: usize,
    pub invisible_removed: usize,
    pub case_changed: usize,
    pub empty_to_missing: usize,
    /// Values changed by at least one step.
    pub values_changed: usize,
}

impl ColumnRepair {
    fn record(&mut self, changes: ValueChanges) {
        self.trimmed += usize::from(changes.trimmed);
        self.invisible_removed += usize::from(changes.invisible);
        self.case_changed += usize::from(changes.case);
        self.empty_to_missing += usize::from(changes.emptied);
        self.values_changed += usize::from(changes.any());
    }
}

/// Per-column outcome of a repair run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub columns: Vec<ColumnRepair>,
}

impl RepairSummary {
    pub fn total_changed(&self) -> usize {
        self.columns.iter().map(|c| c.values_changed).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnRepair> {
        self.columns.iter().find(|c| c.column == name)
    }
}

fn repair_column(column: &Column, options: &RepairOptions) -> Result<(Option<Column>, ColumnRepair)> {
    let mut stats = ColumnRepair {
        column: column.name().to_string(),
        ..ColumnRepair::default()
    };

    if !column.kind().is_textual() || options.is_noop() {
        return Ok((None, stats));
    }

    let mut values = Vec::with_capacity(column.len());
    for value in column.values() {
        match value.as_str() {
            Some(s) => {
                let (repaired, changes) = repair_value(s, options);
                stats.record(changes);
                values.push(repaired);
            }
            None => values.push(None),
        }
    }

    let repaired = match column.kind() {
        ColumnKind::Categorical { levels } => {
            let mut seen = HashSet::new();
            let levels: Vec<String> = levels
                .iter()
                .filter_map(|l| repair_value(l, options).0)
                .filter(|l| seen.insert(l.clone()))
                .collect();
            Column::categorical(column.name(), Some(levels), values)?
        }
        _ => column.with_values(values.into_iter().map(Value::from).collect()),
    };

    Ok((Some(repaired), stats))
}

fn check_columns(table: &Table, columns: &[String]) -> Result<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|c| table.column(c).is_none())
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DiagnosticError::ColumnNotFound {
            side: TableSide::None,
            missing,
        })
    }
}

/// Repair `columns` of `table`, returning a new table and per-column counts.
pub fn repair_columns(
    table: &Table,
    columns: &[String],
    options: &RepairOptions,
) -> Result<(Table, RepairSummary)> {
    check_columns(table, columns)?;
    info!("Repairing {} column(s) with {:?}", columns.len(), options);

    let mut repaired = table.clone();
    let mut summary = RepairSummary::default();

    for name in columns {
        let Some(column) = table.column(name) else {
            continue;
        };
        let (new_column, stats) = repair_column(column, options)?;
        debug!("Repaired '{}': {} value(s) changed", name, stats.values_changed);
        if let Some(new_column) = new_column
            && stats.values_changed > 0
        {
            repaired = repaired.replace_column(new_column)?;
        }
        summary.columns.push(stats);
    }

    Ok((repaired, summary))
}

/// Count what [`repair_columns`] would change without building a table.
pub fn preview_repairs(
    table: &Table,
    columns: &[String],
    options: &RepairOptions,
) -> Result<RepairSummary> {
    check_columns(table, columns)?;

    let mut summary = RepairSummary::default();
    for name in columns {
        let Some(column) = table.column(name) else {
            continue;
        };
        let mut stats = ColumnRepair {
            column: name.clone(),
            ..ColumnRepair::default()
        };
        if column.kind().is_textual() && !options.is_noop() {
            for (_, value) in column.text_values() {
                stats.record(repair_value(value, options).1);
            }
        }
        summary.columns.push(stats);
    }
    Ok(summary)
}
