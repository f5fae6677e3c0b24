//! Error types for join diagnostics.
//!
//! Every fallible operation in the crate returns [`DiagnosticError`]. Metric
//! values that are merely undefined (such as a match rate over an empty key
//! set) are not errors; they are modelled as `Option` on the result types.
//!
//! Errors serialize as `{code, message}` so that presentation layers can
//! render them without matching on the variant.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::keys::TableSide;

/// The main error type for join diagnostics.
#[derive(Error, Debug)]
pub enum DiagnosticError {
    /// One or more key columns are absent from a table.
    #[error("Key column(s) {missing:?} not found in table {side}")]
    ColumnNotFound {
        side: TableSide,
        missing: Vec<String>,
    },

    /// Input could not be interpreted as a table (ragged rows, mixed column
    /// types, empty key specification, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid analysis options.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A strict join was requested and the keys break the expected contract.
    #[error("Cardinality violation: expected {expected}, found {actual}")]
    CardinalityViolation { expected: String, actual: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DiagnosticError>,
    },
}

impl DiagnosticError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DiagnosticError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for callers that dispatch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CardinalityViolation { .. } => "CARDINALITY_VIOLATION",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix the failure by changing its arguments.
    pub fn is_caller_correctable(&self) -> bool {
        match self {
            Self::ColumnNotFound { .. } | Self::InvalidInput(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_caller_correctable(),
            _ => false,
        }
    }
}

impl Serialize for DiagnosticError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DiagnosticError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<crate::config::ConfigValidationError> for DiagnosticError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        DiagnosticError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for diagnostic operations.
pub type Result<T> = std::result::Result<T, DiagnosticError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DiagnosticError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = DiagnosticError::ColumnNotFound {
            side: TableSide::X,
            missing: vec!["id".to_string()],
        };
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert_eq!(
            DiagnosticError::InvalidInput("ragged".to_string()).error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_column_not_found_message_names_side() {
        let err = DiagnosticError::ColumnNotFound {
            side: TableSide::Y,
            missing: vec!["customer_id".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("customer_id"));
        assert!(msg.contains("y"));
    }

    #[test]
    fn test_is_caller_correctable() {
        assert!(DiagnosticError::InvalidConfig("bad".to_string()).is_caller_correctable());
        assert!(
            !DiagnosticError::CardinalityViolation {
                expected: "1:1".to_string(),
                actual: "m:m".to_string(),
            }
            .is_caller_correctable()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = DiagnosticError::InvalidInput("columns have different lengths".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_INPUT"));
        assert!(json.contains("different lengths"));
    }

    #[test]
    fn test_with_context() {
        let error = DiagnosticError::InvalidInput("empty key".to_string())
            .with_context("While validating key spec");
        assert!(error.to_string().contains("While validating key spec"));
        assert_eq!(error.error_code(), "INVALID_INPUT");
    }
}
