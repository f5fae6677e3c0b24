use serde::{Deserialize, Serialize};
use std::fmt;

use super::CaseMode;
use crate::issues::{CasePair, Issue, IssueDetail, IssueKind};
use crate::keys::TableSide;
use crate::report::JoinReport;

/// A repair step that addresses a detected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairAction {
    TrimWhitespace,
    RemoveInvisible,
    FoldCase(CaseMode),
    EmptyToMissing,
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairAction::TrimWhitespace => write!(f, "trim whitespace"),
            RepairAction::RemoveInvisible => write!(f, "remove invisible characters"),
            RepairAction::FoldCase(CaseMode::Lower) => write!(f, "convert to lowercase"),
            RepairAction::FoldCase(CaseMode::Upper) => write!(f, "convert to uppercase"),
            RepairAction::EmptyToMissing => write!(f, "treat empty strings as missing"),
        }
    }
}

/// A suggested repair for specific columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSuggestion {
    pub action: RepairAction,
    pub table: TableSide,
    pub columns: Vec<String>,
    /// The issue message that prompted the suggestion.
    pub reason: String,
}

impl RepairSuggestion {
    /// Whether the suggestion should be applied to the `side` table.
    pub fn applies_to(&self, side: TableSide) -> bool {
        side == TableSide::Both
            || self.table == side
            || matches!(self.table, TableSide::Both | TableSide::None)
    }
}

/// Fold toward y's case when every y value is upper-case, else lower.
fn fold_mode(pairs: &[CasePair]) -> CaseMode {
    let upper = !pairs.is_empty()
        && pairs
            .iter()
            .all(|p| p.y_value == p.y_value.to_uppercase() && p.y_value != p.y_value.to_lowercase());
    if upper { CaseMode::Upper } else { CaseMode::Lower }
}

fn action_for(issue: &Issue) -> Option<RepairAction> {
    match issue.kind {
        IssueKind::Whitespace => Some(RepairAction::TrimWhitespace),
        IssueKind::InvisibleCharacters => Some(RepairAction::RemoveInvisible),
        IssueKind::CaseMismatch => {
            let mode = match &issue.detail {
                IssueDetail::CaseMismatch { pairs } => fold_mode(pairs),
                _ => CaseMode::Lower,
            };
            Some(RepairAction::FoldCase(mode))
        }
        IssueKind::EmptyString => Some(RepairAction::EmptyToMissing),
        _ => None,
    }
}

/// Map repairable issues in `report` to suggested actions.
///
/// Suggestions follow issue order; repeats of the same action on the same
/// table and columns are dropped.
pub fn suggest_repairs(report: &JoinReport) -> Vec<RepairSuggestion> {
    let mut suggestions: Vec<RepairSuggestion> = Vec::new();

    for issue in &report.issues {
        let Some(action) = action_for(issue) else {
            continue;
        };
        let duplicate = suggestions
            .iter()
            .any(|s| s.action == action && s.table == issue.table && s.columns == issue.columns);
        if !duplicate {
            suggestions.push(RepairSuggestion {
                action,
                table: issue.table,
                columns: issue.columns.clone(),
                reason: issue.message.clone(),
            });
        }
    }

    suggestions
}
