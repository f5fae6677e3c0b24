//! Key specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DiagnosticError, Result};

/// Which columns to join on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpec {
    /// Same column names in both tables.
    Shared(Vec<String>),
    /// `(x_column, y_column)` pairs when names differ.
    Pairs(Vec<(String, String)>),
}

impl KeySpec {
    /// Key on columns that have the same name in both tables.
    pub fn shared<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySpec::Shared(columns.into_iter().map(Into::into).collect())
    }

    /// Key on differently named column pairs.
    pub fn pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        KeySpec::Pairs(
            pairs
                .into_iter()
                .map(|(a, b)| (a.into(), b.into()))
                .collect(),
        )
    }

    /// Parse `"id,name"` or `"cust_id=id,region=region"`.
    ///
    /// Entries without `=` use the same name on both sides.
    pub fn parse(spec: &str) -> Result<Self> {
        let entries: Vec<&str> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(DiagnosticError::InvalidInput(
                "key specification is empty".to_string(),
            ));
        }

        if !entries.iter().any(|e| e.contains('=')) {
            return Ok(KeySpec::shared(entries));
        }

        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.split_once('=') {
                Some((x, y)) => {
                    let (x, y) = (x.trim(), y.trim());
                    if x.is_empty() || y.is_empty() {
                        return Err(DiagnosticError::InvalidInput(format!(
                            "malformed key pair '{}'",
                            entry
                        )));
                    }
                    pairs.push((x.to_string(), y.to_string()));
                }
                None => pairs.push((entry.to_string(), entry.to_string())),
            }
        }
        Ok(KeySpec::Pairs(pairs))
    }

    /// Resolved `(x_column, y_column)` pairs.
    pub fn column_pairs(&self) -> Vec<(String, String)> {
        match self {
            KeySpec::Shared(cols) => cols.iter().map(|c| (c.clone(), c.clone())).collect(),
            KeySpec::Pairs(pairs) => pairs.clone(),
        }
    }

    pub fn x_columns(&self) -> Vec<String> {
        self.column_pairs().into_iter().map(|(x, _)| x).collect()
    }

    pub fn y_columns(&self) -> Vec<String> {
        self.column_pairs().into_iter().map(|(_, y)| y).collect()
    }

    /// Number of key columns per side.
    pub fn len(&self) -> usize {
        match self {
            KeySpec::Shared(cols) => cols.len(),
            KeySpec::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// More than one key column.
    pub fn is_composite(&self) -> bool {
        self.len() > 1
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .column_pairs()
            .into_iter()
            .map(|(x, y)| if x == y { x } else { format!("{}={}", x, y) })
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared() {
        let spec = KeySpec::parse("id, region").unwrap();
        assert_eq!(spec, KeySpec::shared(["id", "region"]));
        assert!(spec.is_composite());
    }

    #[test]
    fn test_parse_pairs() {
        let spec = KeySpec::parse("cust_id=id,region").unwrap();
        assert_eq!(
            spec.column_pairs(),
            vec![
                ("cust_id".to_string(), "id".to_string()),
                ("region".to_string(), "region".to_string())
            ]
        );
        assert_eq!(spec.x_columns(), vec!["cust_id", "region"]);
        assert_eq!(spec.y_columns(), vec!["id", "region"]);
        assert_eq!(spec.to_string(), "cust_id=id, region");
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(KeySpec::parse("  , ").is_err());
        assert!(KeySpec::parse("a=").is_err());
    }
}
