use std::collections::{HashMap, HashSet};

use super::{CasePair, Issue, IssueDetail, IssueKind, MAX_EXAMPLES, Severity};
use crate::keys::TableSide;
use crate::table::Column;

/// Find x values with no exact partner in y whose lowercase form matches a
/// y value. Each distinct x value is reported once, paired with the first
/// y value sharing its folded form.
pub fn detect_case_mismatch(x: &Column, y: &Column) -> Option<Issue> {
    if !x.kind().is_textual() || !y.kind().is_textual() {
        return None;
    }

    let y_exact: HashSet<&str> = y.text_values().map(|(_, v)| v).collect();
    let mut y_folded: HashMap<String, &str> = HashMap::new();
    for (_, value) in y.text_values() {
        y_folded.entry(value.to_lowercase()).or_insert(value);
    }

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for (_, value) in x.text_values() {
        if y_exact.contains(value) || !seen.insert(value) {
            continue;
        }
        if let Some(counterpart) = y_folded.get(&value.to_lowercase()) {
            pairs.push(CasePair {
                x_value: value.to_string(),
                y_value: counterpart.to_string(),
            });
        }
    }

    if pairs.is_empty() {
        return None;
    }

    let total = pairs.len();
    pairs.truncate(MAX_EXAMPLES);

    Some(Issue::new(
        IssueKind::CaseMismatch,
        Severity::Warning,
        TableSide::Both,
        vec![x.name().to_string(), y.name().to_string()],
        format!(
            "{} key value(s) in x.{} match y.{} only when case is ignored",
            total,
            x.name(),
            y.name()
        ),
        IssueDetail::CaseMismatch { pairs },
    ))
}
