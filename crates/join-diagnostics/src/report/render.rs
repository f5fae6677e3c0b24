//! Report formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::JoinReport;
use crate::analysis::KeySummary;
use crate::error::{DiagnosticError, Result};

/// Output formats for a [`JoinReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    /// Tab-separated `section  metric  value` rows.
    DataTable,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
            ReportFormat::DataTable => "table",
            ReportFormat::Json => "json",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ReportFormat {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "table" | "data_table" | "tsv" => Ok(ReportFormat::DataTable),
            "json" => Ok(ReportFormat::Json),
            other => Err(DiagnosticError::InvalidInput(format!(
                "unknown report format '{}'",
                other
            ))),
        }
    }
}

/// Render a match rate. An undefined rate is never shown as 0%.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "undefined".to_string(),
    }
}

fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| "overflow".to_string(), |c| c.to_string())
}

/// Render `report` in the requested format.
pub fn render(report: &JoinReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Markdown => Ok(render_markdown(report)),
        ReportFormat::DataTable => Ok(render_table(report)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn summary_line(summary: &KeySummary) -> String {
    format!(
        "{} rows, {} unique keys, {} duplicated key(s) over {} rows, {} NA",
        summary.row_count,
        summary.unique_count,
        summary.duplicate_key_count,
        summary.duplicate_row_count,
        summary.na_count
    )
}

fn render_text(report: &JoinReport) -> String {
    let title = format!("Join diagnostics by {}", report.key_spec);
    let mut lines = vec![title.clone(), "=".repeat(title.chars().count())];

    if let Some(sampling) = report.sampling.as_ref().filter(|_| report.is_estimate()) {
        lines.push(String::new());
        lines.push(format!(
            "Estimated from a sample of {} rows (seed {}); x had {} rows, y had {}",
            sampling.sample_size, sampling.seed, sampling.x_original_rows, sampling.y_original_rows
        ));
    }

    lines.push(String::new());
    lines.push("Keys".to_string());
    lines.push(format!("  x: {}", summary_line(&report.x_summary)));
    lines.push(format!("  y: {}", summary_line(&report.y_summary)));

    let m = &report.match_analysis;
    lines.push(String::new());
    lines.push("Matches".to_string());
    lines.push(format!(
        "  matched: {}  x only: {}  y only: {}  match rate: {}",
        m.matched_count,
        m.left_only_count,
        m.right_only_count,
        format_rate(m.match_rate)
    ));

    lines.push(String::new());
    lines.push("Expected rows".to_string());
    lines.push(match &report.expected_rows {
        Some(rows) => format!(
            "  inner: {}  left: {}  right: {}  full: {}",
            rows.inner, rows.left, rows.right, rows.full
        ),
        None => "  too large to count".to_string(),
    });

    lines.push(String::new());
    lines.push(format!("Cardinality: {}", report.cardinality));

    if let Some(risk) = &report.cartesian_risk {
        let verdict = if risk.at_risk { "AT RISK" } else { "ok" };
        lines.push(String::new());
        lines.push(format!(
            "Cartesian check: {} (expansion {:.2}x, threshold {}x)",
            verdict, risk.expansion_factor, risk.threshold
        ));
        lines.extend(
            risk.worst_offenders
                .iter()
                .map(|e| format!("  {}: {} x {} = {}", e.key, e.x_count, e.y_count, e.product)),
        );
    }

    if let Some(breakdown) = &report.breakdown {
        lines.push(String::new());
        lines.push("Per-column match rates".to_string());
        for col in &breakdown.columns {
            let marker = if breakdown.problem_column.as_deref() == Some(col.x_column.as_str()) {
                "  <- problem column"
            } else {
                ""
            };
            lines.push(format!(
                "  {}: {}{}",
                col.x_column,
                format_rate(col.match_rate),
                marker
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("Issues ({})", report.issues.len()));
    if report.issues.is_empty() {
        lines.push("  none".to_string());
    }
    lines.extend(
        report
            .issues
            .iter()
            .map(|issue| format!("  [{}] {}", issue.severity, issue.message)),
    );

    lines.join("\n") + "\n"
}

fn render_markdown(report: &JoinReport) -> String {
    let mut lines = vec![format!("# Join diagnostics: `{}`", report.key_spec), String::new()];

    if let Some(sampling) = report.sampling.as_ref().filter(|_| report.is_estimate()) {
        lines.push(format!(
            "> Estimated from a sample of {} rows (seed `{}`).",
            sampling.sample_size, sampling.seed
        ));
        lines.push(String::new());
    }

    lines.push("## Keys".to_string());
    lines.push(String::new());
    lines.push("| Table | Rows | Unique | Duplicate keys | Duplicate rows | NA |".to_string());
    lines.push("|---|---:|---:|---:|---:|---:|".to_string());
    for (name, s) in [("x", &report.x_summary), ("y", &report.y_summary)] {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            name,
            s.row_count,
            s.unique_count,
            s.duplicate_key_count,
            s.duplicate_row_count,
            s.na_count
        ));
    }

    let m = &report.match_analysis;
    lines.extend([
        String::new(),
        "## Matches".to_string(),
        String::new(),
        format!("- Matched keys: {}", m.matched_count),
        format!("- Only in x: {}", m.left_only_count),
        format!("- Only in y: {}", m.right_only_count),
        format!("- Match rate: {}", format_rate(m.match_rate)),
    ]);

    let rows = report.expected_rows.as_ref();
    lines.extend([
        String::new(),
        "## Expected rows".to_string(),
        String::new(),
        "| inner | left | right | full |".to_string(),
        "|---:|---:|---:|---:|".to_string(),
        format!(
            "| {} | {} | {} | {} |",
            format_count(rows.map(|r| r.inner)),
            format_count(rows.map(|r| r.left)),
            format_count(rows.map(|r| r.right)),
            format_count(rows.map(|r| r.full))
        ),
    ]);

    lines.push(String::new());
    lines.push(format!("**Cardinality:** `{}`", report.cardinality));

    if let Some(risk) = &report.cartesian_risk {
        lines.push(String::new());
        lines.push(format!(
            "**Cartesian risk:** {} ({:.2}x against {}x)",
            if risk.at_risk { "yes" } else { "no" },
            risk.expansion_factor,
            risk.threshold
        ));
    }

    if let Some(breakdown) = &report.breakdown {
        lines.extend([
            String::new(),
            "## Per-column match rates".to_string(),
            String::new(),
            "| Column | Match rate |".to_string(),
            "|---|---:|".to_string(),
        ]);
        lines.extend(
            breakdown
                .columns
                .iter()
                .map(|col| format!("| {} | {} |", col.x_column, format_rate(col.match_rate))),
        );
        if let Some(problem) = &breakdown.problem_column {
            lines.push(String::new());
            lines.push(format!("Problem column: `{}`", problem));
        }
    }

    lines.extend([String::new(), "## Issues".to_string(), String::new()]);
    if report.issues.is_empty() {
        lines.push("No issues found.".to_string());
    }
    lines.extend(report.issues.iter().map(|issue| {
        format!("- **{}** ({}): {}", issue.severity, issue.kind, issue.message)
    }));

    lines.join("\n") + "\n"
}

fn render_table(report: &JoinReport) -> String {
    let mut rows: Vec<(String, &str, String)> = Vec::new();

    for (section, s) in [("x_keys", &report.x_summary), ("y_keys", &report.y_summary)] {
        rows.push((section.to_string(), "row_count", s.row_count.to_string()));
        rows.push((section.to_string(), "unique_count", s.unique_count.to_string()));
        rows.push((
            section.to_string(),
            "duplicate_key_count",
            s.duplicate_key_count.to_string(),
        ));
        rows.push((
            section.to_string(),
            "duplicate_row_count",
            s.duplicate_row_count.to_string(),
        ));
        rows.push((section.to_string(), "na_count", s.na_count.to_string()));
    }

    let m = &report.match_analysis;
    rows.push(("matches".into(), "matched_count", m.matched_count.to_string()));
    rows.push(("matches".into(), "left_only_count", m.left_only_count.to_string()));
    rows.push(("matches".into(), "right_only_count", m.right_only_count.to_string()));
    rows.push((
        "matches".into(),
        "match_rate",
        m.match_rate
            .map_or_else(|| "undefined".to_string(), |r| format!("{:.4}", r)),
    ));

    let counts = report.expected_rows.as_ref();
    rows.push(("expected_rows".into(), "inner", format_count(counts.map(|r| r.inner))));
    rows.push(("expected_rows".into(), "left", format_count(counts.map(|r| r.left))));
    rows.push(("expected_rows".into(), "right", format_count(counts.map(|r| r.right))));
    rows.push(("expected_rows".into(), "full", format_count(counts.map(|r| r.full))));

    rows.push(("relationship".into(), "cardinality", report.cardinality.to_string()));

    if let Some(risk) = &report.cartesian_risk {
        rows.push(("cartesian".into(), "at_risk", risk.at_risk.to_string()));
        rows.push((
            "cartesian".into(),
            "expansion_factor",
            format!("{:.4}", risk.expansion_factor),
        ));
    }

    rows.push(("issues".into(), "count", report.issues.len().to_string()));
    for issue in &report.issues {
        rows.push((
            format!("issue.{}", issue.table),
            issue.kind.as_str(),
            issue.severity.to_string(),
        ));
    }

    let mut lines = vec!["section\tmetric\tvalue".to_string()];
    lines.extend(
        rows.into_iter()
            .map(|(section, metric, value)| format!("{}\t{}\t{}", section, metric, value)),
    );
    lines.join("\n") + "\n"
}
