//! JSON audit records.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::JoinReport;
use crate::error::{DiagnosticError, Result};

/// A report as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Local time the record was written.
    pub generated_at: String,
    /// Version of the crate that produced the report.
    pub tool_version: String,
    pub report: JoinReport,
}

/// Writes reports as `<name>_report.json` files.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report` to `<output_dir>/<report_base_name>_report.json`,
    /// creating the directory if needed. Returns the written path.
    pub fn write_report_to_file(&self, report: &JoinReport, report_base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            DiagnosticError::from(e).with_context(format!("creating {}", self.output_dir.display()))
        })?;

        let record = ReportRecord {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            report: report.clone(),
        };

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(&record)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Load a record written by [`write_report_to_file`](Self::write_report_to_file).
    pub fn read_record(path: &Path) -> Result<ReportRecord> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DiagnosticError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;
    use crate::engine::analyze;
    use crate::keys::KeySpec;
    use crate::table::{Column, Table};

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let x = Table::new(vec![Column::text("id", vec![Some("a"), Some("b ")])]).unwrap();
        let y = Table::new(vec![Column::text("id", vec![Some("a"), Some("b")])]).unwrap();
        let report = analyze(&x, &y, &KeySpec::shared(["id"]), &AnalysisOptions::default()).unwrap();

        let writer = ReportWriter::new(dir.path().join("reports"));
        let path = writer.write_report_to_file(&report, "orders").unwrap();
        assert_eq!(path.file_name().unwrap(), "orders_report.json");

        let record = ReportWriter::read_record(&path).unwrap();
        assert_eq!(record.report, report);
        assert!(!record.generated_at.is_empty());
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let err = ReportWriter::read_record(Path::new("/nonexistent/x_report.json")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("reading"));
    }
}
