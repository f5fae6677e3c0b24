//! Relationship classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DiagnosticError, Result};

/// Coarse join relationship derived from duplicate presence on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:m")]
    OneToMany,
    #[serde(rename = "m:1")]
    ManyToOne,
    #[serde(rename = "m:m")]
    ManyToMany,
}

impl Cardinality {
    /// Classify from whether x and y contain duplicate keys.
    pub fn classify(x_has_duplicates: bool, y_has_duplicates: bool) -> Self {
        match (x_has_duplicates, y_has_duplicates) {
            (true, true) => Cardinality::ManyToMany,
            (true, false) => Cardinality::ManyToOne,
            (false, true) => Cardinality::OneToMany,
            (false, false) => Cardinality::OneToOne,
        }
    }

    /// The classification seen with x and y swapped.
    pub fn swapped(self) -> Self {
        match self {
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:m",
            Cardinality::ManyToOne => "m:1",
            Cardinality::ManyToMany => "m:m",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1:1" | "one-to-one" => Ok(Cardinality::OneToOne),
            "1:m" | "one-to-many" => Ok(Cardinality::OneToMany),
            "m:1" | "many-to-one" => Ok(Cardinality::ManyToOne),
            "m:m" | "many-to-many" => Ok(Cardinality::ManyToMany),
            other => Err(DiagnosticError::InvalidInput(format!(
                "unknown cardinality '{}'",
                other
            ))),
        }
    }
}

/// Check duplicate presence against an expected relationship.
///
/// The contract is asymmetric: `1:m` requires unique x keys, `m:1`
/// requires unique y keys, `1:1` requires both, `m:m` accepts anything.
pub fn check_cardinality(
    expected: Cardinality,
    x_has_duplicates: bool,
    y_has_duplicates: bool,
) -> Result<()> {
    let violated = match expected {
        Cardinality::OneToOne => x_has_duplicates || y_has_duplicates,
        Cardinality::OneToMany => x_has_duplicates,
        Cardinality::ManyToOne => y_has_duplicates,
        Cardinality::ManyToMany => false,
    };

    if violated {
        let actual = Cardinality::classify(x_has_duplicates, y_has_duplicates);
        return Err(DiagnosticError::CardinalityViolation {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
