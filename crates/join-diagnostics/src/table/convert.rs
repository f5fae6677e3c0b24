//! Conversion between polars `DataFrame`s and [`Table`].

use polars::prelude::*;
use tracing::debug;

use super::{Column as TableColumn, ColumnKind, Table, Value};
use crate::error::{Result, ResultExt};

/// Category of a polars data type as seen by the diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DtypeCategory {
    Integer,
    Float,
    Boolean,
    Text,
    Categorical,
    /// Dates, times, nested types: rendered to text.
    Other,
}

/// Check if a DataType is an integer type.
#[inline]
fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Get the category of a DataType.
pub(crate) fn dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_integer_dtype(dtype) {
        DtypeCategory::Integer
    } else if matches!(dtype, DataType::Float32 | DataType::Float64) {
        DtypeCategory::Float
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::Text
    } else if matches!(dtype, DataType::Categorical(_, _) | DataType::Enum(_, _)) {
        DtypeCategory::Categorical
    } else {
        DtypeCategory::Other
    }
}

fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let as_text = series
        .cast(&DataType::String)
        .context(format!("casting column '{}' to text", series.name()))?;
    let chunked = as_text.str()?;
    Ok(chunked
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect())
}

fn convert_series(series: &Series) -> Result<TableColumn> {
    let name = series.name().to_string();

    let column = match dtype_category(series.dtype()) {
        DtypeCategory::Integer => {
            // UInt64 values above i64::MAX would otherwise become nulls.
            let cast = series.strict_cast(&DataType::Int64).context(format!(
                "column '{}' has integers outside the 64-bit signed range",
                name
            ))?;
            TableColumn::integer(name, cast.i64()?.into_iter())
        }
        DtypeCategory::Float => {
            let cast = series.cast(&DataType::Float64)?;
            TableColumn::float(name, cast.f64()?.into_iter())
        }
        DtypeCategory::Boolean => TableColumn::boolean(name, series.bool()?.into_iter()),
        DtypeCategory::Text => TableColumn::text(name, series.str()?.into_iter()),
        DtypeCategory::Categorical => TableColumn::categorical(name, None, string_values(series)?)?,
        DtypeCategory::Other => {
            debug!(
                "Column '{}' has dtype {:?}; treating it as text",
                name,
                series.dtype()
            );
            TableColumn::text(name, string_values(series)?)
        }
    };

    Ok(column)
}

impl Table {
    /// Convert a polars `DataFrame` into a [`Table`].
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| convert_series(col.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;

        Table::new(columns)
    }

    /// Convert this table into a polars `DataFrame`.
    ///
    /// Categorical columns are written as strings.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns()
            .iter()
            .map(|col| {
                let name: PlSmallStr = col.name().into();
                let series = match col.kind() {
                    ColumnKind::Integer => {
                        let values: Vec<Option<i64>> = col
                            .values()
                            .iter()
                            .map(|v| match v {
                                Value::Integer(i) => Some(*i),
                                _ => None,
                            })
                            .collect();
                        Series::new(name, values)
                    }
                    ColumnKind::Float => {
                        let values: Vec<Option<f64>> =
                            col.values().iter().map(Value::as_f64).collect();
                        Series::new(name, values)
                    }
                    ColumnKind::Boolean => {
                        let values: Vec<Option<bool>> = col
                            .values()
                            .iter()
                            .map(|v| match v {
                                Value::Boolean(b) => Some(*b),
                                _ => None,
                            })
                            .collect();
                        Series::new(name, values)
                    }
                    ColumnKind::Text | ColumnKind::Categorical { .. } => {
                        let values: Vec<Option<&str>> =
                            col.values().iter().map(Value::as_str).collect();
                        Series::new(name, values)
                    }
                };
                series.into_column()
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_category() {
        assert_eq!(dtype_category(&DataType::Int32), DtypeCategory::Integer);
        assert_eq!(dtype_category(&DataType::UInt64), DtypeCategory::Integer);
        assert_eq!(dtype_category(&DataType::Float64), DtypeCategory::Float);
        assert_eq!(dtype_category(&DataType::Boolean), DtypeCategory::Boolean);
        assert_eq!(dtype_category(&DataType::String), DtypeCategory::Text);
        assert_eq!(dtype_category(&DataType::Date), DtypeCategory::Other);
    }

    #[test]
    fn test_from_dataframe() {
        let df = df! {
            "id" => &[Some(1i64), Some(2), None],
            "name" => &[Some("a"), None, Some("c")],
            "score" => &[1.5f64, 2.0, 3.25],
            "flag" => &[true, false, true],
        }
        .unwrap();

        let table = Table::from_dataframe(&df).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.width(), 4);

        let id = table.column("id").unwrap();
        assert_eq!(id.kind(), &ColumnKind::Integer);
        assert_eq!(id.values()[2], Value::Missing);

        let name = table.column("name").unwrap();
        assert_eq!(name.kind(), &ColumnKind::Text);
        assert_eq!(name.values()[0], Value::Text("a".to_string()));

        assert_eq!(table.column("score").unwrap().kind(), &ColumnKind::Float);
        assert_eq!(table.column("flag").unwrap().kind(), &ColumnKind::Boolean);
    }

    #[test]
    fn test_unsigned_overflow_is_an_error() {
        let df = df! { "id" => &[u64::MAX, 1u64] }.unwrap();
        let err = Table::from_dataframe(&df).unwrap_err();
        assert!(err.to_string().contains("column 'id'"));

        let df = df! { "id" => &[7u64, 1u64] }.unwrap();
        let table = Table::from_dataframe(&df).unwrap();
        let id = table.column("id").unwrap();
        assert_eq!(id.kind(), &ColumnKind::Integer);
        assert_eq!(id.values()[0], Value::Integer(7));
    }

    #[test]
    fn test_to_dataframe_keeps_shape_and_nulls() {
        let table = Table::new(vec![
            TableColumn::integer("id", vec![Some(1), None]),
            TableColumn::text("name", vec![Some("x"), None]),
        ])
        .unwrap();

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("id").unwrap().null_count(), 1);
        assert_eq!(df.column("name").unwrap().null_count(), 1);

        let back = Table::from_dataframe(&df).unwrap();
        assert_eq!(back, table);
    }
}
