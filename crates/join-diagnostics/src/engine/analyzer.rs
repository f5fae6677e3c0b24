use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::{
    Cardinality, KeySummary, analyze_matches, breakdown_columns, estimate_cartesian_risk,
    predict_row_counts,
};
use crate::config::AnalysisOptions;
use crate::error::{DiagnosticError, Result};
use crate::issues::{self, Issue};
use crate::keys::{KeySpec, TableSide, derive_keys};
use crate::report::{JoinReport, LastReport, SamplingInfo};
use crate::table::{Table, sample_rows};

/// Runs join analyses with a fixed set of options.
///
/// Use [`JoinAnalyzer::builder()`] to create an analyzer.
///
/// # Example
///
/// ```rust,ignore
/// use join_diagnostics::{JoinAnalyzer, AnalysisOptions, KeySpec};
/// use join_diagnostics::report::LastReport;
/// use std::sync::Arc;
///
/// let last = Arc::new(LastReport::new());
/// let analyzer = JoinAnalyzer::builder()
///     .options(AnalysisOptions::builder().cartesian_threshold(5.0).build()?)
///     .remember_last(last.clone())
///     .build()?;
///
/// let report = analyzer.analyze(&orders, &customers, &KeySpec::parse("customer_id=id")?)?;
/// assert_eq!(last.get().as_deref(), Some(&report));
/// ```
#[derive(Debug)]
pub struct JoinAnalyzer {
    options: AnalysisOptions,
    last_report: Option<Arc<LastReport>>,
}

static_assertions::assert_impl_all!(JoinAnalyzer: Send, Sync);

impl JoinAnalyzer {
    /// Create a new analyzer builder.
    pub fn builder() -> JoinAnalyzerBuilder {
        JoinAnalyzerBuilder::default()
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze the prospective join of `x` and `y` on `key_spec`.
    ///
    /// # Errors
    ///
    /// [`DiagnosticError::ColumnNotFound`] when a key column is absent from
    /// either table, [`DiagnosticError::InvalidInput`] for an empty key
    /// specification.
    pub fn analyze(&self, x: &Table, y: &Table, key_spec: &KeySpec) -> Result<JoinReport> {
        let report = run_analysis(x, y, key_spec, &self.options)?;
        if let Some(slot) = &self.last_report {
            slot.store(report.clone());
        }
        Ok(report)
    }
}

/// Builder for [`JoinAnalyzer`].
#[derive(Debug, Default)]
pub struct JoinAnalyzerBuilder {
    options: Option<AnalysisOptions>,
    last_report: Option<Arc<LastReport>>,
}

impl JoinAnalyzerBuilder {
    /// Set the analysis options. Defaults apply when not called.
    pub fn options(mut self, options: AnalysisOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Store every produced report in `slot`.
    pub fn remember_last(mut self, slot: Arc<LastReport>) -> Self {
        self.last_report = Some(slot);
        self
    }

    /// Build the analyzer, validating its options.
    pub fn build(self) -> Result<JoinAnalyzer> {
        let options = self.options.unwrap_or_default();
        options.validate()?;
        Ok(JoinAnalyzer {
            options,
            last_report: self.last_report,
        })
    }
}

/// Analyze the prospective join of `x` and `y` on `key_spec`.
///
/// Shorthand for building a [`JoinAnalyzer`] with `options`.
pub fn analyze(
    x: &Table,
    y: &Table,
    key_spec: &KeySpec,
    options: &AnalysisOptions,
) -> Result<JoinReport> {
    options.validate()?;
    run_analysis(x, y, key_spec, options)
}

fn check_key_columns(x: &Table, y: &Table, key_spec: &KeySpec) -> Result<()> {
    if key_spec.is_empty() {
        return Err(DiagnosticError::InvalidInput(
            "at least one key column is required".to_string(),
        ));
    }

    for (table, columns, side) in [
        (x, key_spec.x_columns(), TableSide::X),
        (y, key_spec.y_columns(), TableSide::Y),
    ] {
        let missing: Vec<String> = columns
            .into_iter()
            .filter(|c| table.column(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DiagnosticError::ColumnNotFound { side, missing });
        }
    }
    Ok(())
}

fn sample_inputs(
    x: &Table,
    y: &Table,
    options: &AnalysisOptions,
) -> (Option<(Table, Table)>, Option<SamplingInfo>) {
    let Some(size) = options.sample_size else {
        return (None, None);
    };

    let (xs, seed) = sample_rows(x, size, options.sample_seed);
    let (ys, _) = sample_rows(y, size, Some(seed));
    debug!(
        "Sampled {} of {} x rows and {} of {} y rows (seed {})",
        xs.height(),
        x.height(),
        ys.height(),
        y.height(),
        seed
    );

    let info = SamplingInfo {
        sample_size: size,
        seed,
        x_original_rows: x.height() as u64,
        y_original_rows: y.height() as u64,
        x_sampled_rows: xs.height() as u64,
        y_sampled_rows: ys.height() as u64,
    };
    (Some((xs, ys)), Some(info))
}

fn run_analysis(
    x: &Table,
    y: &Table,
    key_spec: &KeySpec,
    options: &AnalysisOptions,
) -> Result<JoinReport> {
    let start = Instant::now();
    info!(
        "Analyzing join by {} ({} x rows, {} y rows)",
        key_spec,
        x.height(),
        y.height()
    );

    check_key_columns(x, y, key_spec)?;

    let (sampled, sampling) = sample_inputs(x, y, options);
    let (x, y) = match &sampled {
        Some((xs, ys)) => (xs, ys),
        None => (x, y),
    };

    let x_columns = key_spec.x_columns();
    let y_columns = key_spec.y_columns();
    let x_freq = derive_keys(x, &x_columns, TableSide::X)?.frequencies();
    let y_freq = derive_keys(y, &y_columns, TableSide::Y)?.frequencies();

    let x_summary = KeySummary::from_frequencies(&x_freq);
    let y_summary = KeySummary::from_frequencies(&y_freq);
    debug!(
        "Key summaries: x {} unique / {} NA, y {} unique / {} NA",
        x_summary.unique_count, x_summary.na_count, y_summary.unique_count, y_summary.na_count
    );

    let match_analysis = analyze_matches(&x_freq, &y_freq);
    let expected_rows = predict_row_counts(&x_freq, &y_freq);
    if expected_rows.is_none() {
        warn!("Predicted row counts overflow 64 bits");
    }
    let cardinality = Cardinality::classify(x_summary.has_duplicates(), y_summary.has_duplicates());

    let mut found: Vec<Issue> = Vec::new();
    found.extend(issues::duplicate_key_issue(&x_summary, TableSide::X, &x_columns));
    found.extend(issues::duplicate_key_issue(&y_summary, TableSide::Y, &y_columns));
    found.extend(issues::missing_key_issue(&x_summary, TableSide::X, &x_columns));
    found.extend(issues::missing_key_issue(&y_summary, TableSide::Y, &y_columns));
    found.extend(issues::no_match_issue(&match_analysis, &x_columns));

    for (x_col, y_col) in key_spec.column_pairs() {
        // Both columns exist: checked above.
        if let (Some(xc), Some(yc)) = (x.column(&x_col), y.column(&y_col)) {
            found.extend(issues::detect_column_pair(xc, yc, options));
        }
    }
    debug!("{} issue(s) detected", found.len());

    let cartesian_risk = options
        .check_cartesian
        .then(|| estimate_cartesian_risk(&x_freq, &y_freq, options.cartesian_threshold));
    if let Some(risk) = cartesian_risk.as_ref().filter(|r| r.at_risk) {
        warn!(
            "Cartesian risk: expansion factor {:.2} exceeds {}",
            risk.expansion_factor, risk.threshold
        );
    }

    let breakdown = if key_spec.is_composite() {
        Some(breakdown_columns(x, y, &key_spec.column_pairs())?)
    } else {
        None
    };

    info!(
        "Join analysis finished in {:?}: {} matched key(s), cardinality {}, {} issue(s)",
        start.elapsed(),
        match_analysis.matched_count,
        cardinality,
        found.len()
    );

    Ok(JoinReport {
        key_spec: key_spec.clone(),
        x_summary,
        y_summary,
        match_analysis,
        expected_rows,
        cardinality,
        issues: found,
        cartesian_risk,
        breakdown,
        sampling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::IssueKind;
    use crate::table::Column;

    fn ids(values: &[i64]) -> Table {
        Table::new(vec![Column::integer("id", values.iter().map(|&v| Some(v)))]).unwrap()
    }

    #[test]
    fn test_duplicates_in_x() {
        let report = analyze(
            &ids(&[1, 2, 2, 3]),
            &ids(&[1, 2, 3]),
            &KeySpec::shared(["id"]),
            &AnalysisOptions::default(),
        )
        .unwrap();

        assert_eq!(report.x_summary.duplicate_key_count, 1);
        assert_eq!(report.x_summary.duplicate_row_count, 2);
        let rows = report.expected_rows.unwrap();
        assert_eq!((rows.inner, rows.left, rows.right, rows.full), (4, 4, 4, 4));
        assert_eq!(report.cardinality, Cardinality::ManyToOne);
        assert_eq!(report.issues_of(IssueKind::DuplicateKeys).count(), 1);
    }

    #[test]
    fn test_missing_columns_fail_before_analysis() {
        let err = analyze(
            &ids(&[1]),
            &ids(&[1]),
            &KeySpec::pairs([("id", "customer_id")]),
            &AnalysisOptions::default(),
        )
        .unwrap_err();
        match err {
            DiagnosticError::ColumnNotFound { side, missing } => {
                assert_eq!(side, TableSide::Y);
                assert_eq!(missing, vec!["customer_id".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_key_spec_is_invalid() {
        let err = analyze(
            &ids(&[1]),
            &ids(&[1]),
            &KeySpec::Shared(Vec::new()),
            &AnalysisOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = AnalysisOptions {
            cartesian_threshold: -1.0,
            ..AnalysisOptions::default()
        };
        let err = analyze(&ids(&[1]), &ids(&[1]), &KeySpec::shared(["id"]), &options).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(JoinAnalyzer::builder().options(options).build().is_err());
    }

    #[test]
    fn test_sampling_is_recorded_and_reproducible() {
        let big: Vec<i64> = (0..200).collect();
        let options = AnalysisOptions::builder()
            .sample_size(50)
            .sample_seed(7)
            .build()
            .unwrap();

        let a = analyze(&ids(&big), &ids(&big), &KeySpec::shared(["id"]), &options).unwrap();
        let b = analyze(&ids(&big), &ids(&big), &KeySpec::shared(["id"]), &options).unwrap();
        assert_eq!(a, b);

        let sampling = a.sampling.as_ref().unwrap();
        assert_eq!(sampling.seed, 7);
        assert_eq!(sampling.x_original_rows, 200);
        assert_eq!(sampling.x_sampled_rows, 50);
        assert!(a.is_estimate());
        assert_eq!(a.x_summary.row_count, 50);
    }

    #[test]
    fn test_composite_key_gets_breakdown() {
        let x = Table::new(vec![
            Column::integer("id", vec![Some(1), Some(2)]),
            Column::text("region", vec![Some("n"), Some("s")]),
        ])
        .unwrap();
        let report = analyze(&x, &x, &KeySpec::shared(["id", "region"]), &AnalysisOptions::default())
            .unwrap();
        assert_eq!(report.breakdown.unwrap().columns.len(), 2);
    }

    #[test]
    fn test_cartesian_check_can_be_disabled() {
        let options = AnalysisOptions::builder().check_cartesian(false).build().unwrap();
        let report = analyze(&ids(&[1]), &ids(&[1]), &KeySpec::shared(["id"]), &options).unwrap();
        assert!(report.cartesian_risk.is_none());
    }

    #[test]
    fn test_analyzer_remembers_last_report() {
        let slot = Arc::new(LastReport::new());
        let analyzer = JoinAnalyzer::builder()
            .remember_last(Arc::clone(&slot))
            .build()
            .unwrap();
        let report = analyzer
            .analyze(&ids(&[1, 2]), &ids(&[2]), &KeySpec::shared(["id"]))
            .unwrap();
        assert_eq!(slot.get().as_deref(), Some(&report));
    }
}
