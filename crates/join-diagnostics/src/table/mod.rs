//! In-memory tabular data used by the diagnostics.
//!
//! Tables are column-oriented. Each column has one [`ColumnKind`] and a
//! vector of [`Value`]s of that kind (or [`Value::Missing`]). Detectors
//! pattern-match on the kind instead of inspecting values at runtime.
//!
//! Use [`Table::from_dataframe`] to bring in a polars `DataFrame`, and
//! [`sample_rows`] to pre-sample large inputs before analysis.

mod convert;
mod sampling;

pub use sampling::sample_rows;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{DiagnosticError, Result};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Categorical(String),
    Missing,
}

impl Value {
    /// Whether the value is missing. `NaN` floats count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Borrow the string content of text and categorical values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Categorical(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Categorical(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Missing => write!(f, "NA"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Missing, Into::into)
    }
}

/// The type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
    /// Factor column with an ordered set of levels.
    Categorical { levels: Vec<String> },
}

impl ColumnKind {
    /// Short lowercase name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Categorical { .. } => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Text or categorical.
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Categorical { .. })
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Text column from optional strings.
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map_or(Value::Missing, |s| Value::Text(s.into())))
            .collect();
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
            values,
        }
    }

    /// Integer column from optional integers.
    pub fn integer<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::Integer))
            .collect();
        Self {
            name: name.into(),
            kind: ColumnKind::Integer,
            values,
        }
    }

    /// Float column from optional floats. `NaN` is stored as missing.
    pub fn float<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values = values
            .into_iter()
            .map(|v| match v {
                Some(f) if !f.is_nan() => Value::Float(f),
                _ => Value::Missing,
            })
            .collect();
        Self {
            name: name.into(),
            kind: ColumnKind::Float,
            values,
        }
    }

    /// Boolean column from optional booleans.
    pub fn boolean<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::Boolean))
            .collect();
        Self {
            name: name.into(),
            kind: ColumnKind::Boolean,
            values,
        }
    }

    /// Categorical column.
    ///
    /// When `levels` is `None` the levels are the distinct values in
    /// first-seen order. Explicit levels may include categories that never
    /// occur; values outside the explicit levels are rejected.
    pub fn categorical<I, S>(
        name: impl Into<String>,
        levels: Option<Vec<String>>,
        values: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<Value> = values
            .into_iter()
            .map(|v| v.map_or(Value::Missing, |s| Value::Categorical(s.into())))
            .collect();

        let levels = match levels {
            Some(levels) => {
                let allowed: HashSet<&str> = levels.iter().map(String::as_str).collect();
                if let Some(bad) = values
                    .iter()
                    .filter_map(Value::as_str)
                    .find(|v| !allowed.contains(v))
                {
                    return Err(DiagnosticError::InvalidInput(format!(
                        "value '{}' in column '{}' is not one of its levels",
                        bad, name
                    )));
                }
                levels
            }
            None => distinct_strings(&values),
        };

        Ok(Self {
            name,
            kind: ColumnKind::Categorical { levels },
            values,
        })
    }

    /// Build a column from heterogeneous values, inferring its kind.
    ///
    /// Integers and floats unify to a float column. Any other mix of kinds
    /// is rejected. An all-missing column is typed as text.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        let mut kind: Option<ColumnKind> = None;

        for value in &values {
            let value_kind = match value {
                Value::Missing => continue,
                Value::Float(f) if f.is_nan() => continue,
                Value::Text(_) => ColumnKind::Text,
                Value::Integer(_) => ColumnKind::Integer,
                Value::Float(_) => ColumnKind::Float,
                Value::Boolean(_) => ColumnKind::Boolean,
                Value::Categorical(_) => ColumnKind::Categorical { levels: Vec::new() },
            };

            kind = Some(match (kind, value_kind) {
                (None, k) => k,
                (Some(a), b) if a.name() == b.name() => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                (Some(a), b) => {
                    return Err(DiagnosticError::InvalidInput(format!(
                        "column '{}' mixes {} and {} values",
                        name,
                        a.name(),
                        b.name()
                    )));
                }
            });
        }

        let kind = kind.unwrap_or(ColumnKind::Text);
        let values = match kind {
            ColumnKind::Float => values
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => Value::Float(i as f64),
                    Value::Float(f) if f.is_nan() => Value::Missing,
                    other => other,
                })
                .collect(),
            _ => values,
        };

        let kind = match kind {
            ColumnKind::Categorical { .. } => ColumnKind::Categorical {
                levels: distinct_strings(&values),
            },
            other => other,
        };

        Ok(Self {
            name,
            kind,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Iterate over the string content of a textual column, keeping row
    /// positions. Non-textual columns yield nothing.
    pub fn text_values(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.as_str().map(|s| (idx, s)))
    }

    /// Copy this column with a new set of values of the same kind.
    pub(crate) fn with_values(&self, values: Vec<Value>) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            values,
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        let values = indices
            .iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or(Value::Missing))
            .collect();
        self.with_values(values)
    }
}

/// Distinct non-missing string values in first-seen order.
fn distinct_strings(values: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// A rectangular, column-oriented table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Build a table from columns of equal length with unique names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);

        let mut names = HashSet::new();
        for col in &columns {
            if col.len() != height {
                return Err(DiagnosticError::InvalidInput(format!(
                    "column '{}' has {} rows, expected {}",
                    col.name(),
                    col.len(),
                    height
                )));
            }
            if !names.insert(col.name()) {
                return Err(DiagnosticError::InvalidInput(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }

        Ok(Self { columns, height })
    }

    /// Build a table from row records.
    ///
    /// Every row must have one value per column name. Column kinds are
    /// inferred with [`Column::from_values`].
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut buckets: Vec<Vec<Value>> =
            names.iter().map(|_| Vec::with_capacity(rows.len())).collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(DiagnosticError::InvalidInput(format!(
                    "row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    names.len()
                )));
            }
            for (bucket, value) in buckets.iter_mut().zip(row) {
                bucket.push(value);
            }
        }

        let columns = names
            .iter()
            .zip(buckets)
            .map(|(name, values)| Column::from_values(name.as_ref(), values))
            .collect::<Result<Vec<_>>>()?;

        Self::new(columns)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Values of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.height {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    /// New table containing the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            height: indices.len(),
        }
    }

    /// New table with one column replaced by `column` (matched by name).
    pub(crate) fn replace_column(&self, column: Column) -> Result<Self> {
        let mut columns = self.columns.clone();
        let slot = columns
            .iter_mut()
            .find(|c| c.name() == column.name())
            .ok_or_else(|| {
                DiagnosticError::InvalidInput(format!("no column named '{}'", column.name()))
            })?;
        *slot = column;
        Self::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_infers_kind() {
        let col = Column::from_values("id", vec![Value::Integer(1), Value::Missing]).unwrap();
        assert_eq!(col.kind(), &ColumnKind::Integer);

        let col = Column::from_values("x", vec![Value::Integer(1), Value::Float(2.5)]).unwrap();
        assert_eq!(col.kind(), &ColumnKind::Float);
        assert_eq!(col.values()[0], Value::Float(1.0));
    }

    #[test]
    fn test_from_values_rejects_mixed_kinds() {
        let result = Column::from_values("x", vec![Value::Integer(1), Value::from("a")]);
        assert!(matches!(result, Err(DiagnosticError::InvalidInput(_))));
    }

    #[test]
    fn test_all_missing_column_is_text() {
        let col = Column::from_values("x", vec![Value::Missing, Value::Missing]).unwrap();
        assert_eq!(col.kind(), &ColumnKind::Text);
        assert_eq!(col.missing_count(), 2);
    }

    #[test]
    fn test_categorical_levels() {
        let col = Column::categorical("c", None, vec![Some("b"), Some("a"), Some("b"), None]).unwrap();
        assert_eq!(
            col.kind(),
            &ColumnKind::Categorical {
                levels: vec!["b".to_string(), "a".to_string()]
            }
        );

        let explicit = Column::categorical(
            "c",
            Some(vec!["a".to_string(), "b".to_string(), "z".to_string()]),
            vec![Some("a")],
        )
        .unwrap();
        assert!(matches!(explicit.kind(), ColumnKind::Categorical { levels } if levels.len() == 3));

        let bad = Column::categorical("c", Some(vec!["a".to_string()]), vec![Some("q")]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_float_nan_is_missing() {
        let col = Column::float("f", vec![Some(1.0), Some(f64::NAN)]);
        assert_eq!(col.values()[1], Value::Missing);
        assert!(Value::Float(f64::NAN).is_missing());
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::integer("a", vec![Some(1), Some(2)]),
            Column::integer("b", vec![Some(1)]),
        ]);
        assert!(matches!(result, Err(DiagnosticError::InvalidInput(_))));
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::integer("a", vec![Some(1)]),
            Column::integer("a", vec![Some(2)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_rows() {
        let table = Table::from_rows(
            &["id", "name"],
            vec![
                vec![Value::Integer(1), Value::from("a")],
                vec![Value::Integer(2), Value::Missing],
            ],
        )
        .unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.row(1).unwrap()[1], &Value::Missing);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = Table::from_rows(&["id"], vec![vec![Value::Integer(1), Value::Integer(2)]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_rows_keeps_order() {
        let table = Table::new(vec![Column::integer("id", vec![Some(10), Some(20), Some(30)])]).unwrap();
        let picked = table.select_rows(&[2, 0]);
        assert_eq!(picked.height(), 2);
        assert_eq!(
            picked.column("id").unwrap().values(),
            &[Value::Integer(30), Value::Integer(10)]
        );
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(Vec::new()).unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), 0);
    }
}
