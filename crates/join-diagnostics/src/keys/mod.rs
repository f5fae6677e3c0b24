//! Join keys.
//!
//! A [`Key`] is a true tuple of [`KeyPart`]s, one per key column, so
//! composite keys can never collide across column boundaries the way
//! separator-joined strings can. A row with any missing component has no
//! key; it is counted separately as an NA key.
//!
//! [`derive_keys`] is the single place where key columns are checked for
//! existence. Everything downstream works on the derived [`KeyVector`].

mod spec;

pub use spec::KeySpec;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{DiagnosticError, Result};
use crate::table::{Table, Value};

/// Largest integer magnitude a 64-bit float represents exactly (2^53).
pub const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

/// Which table a finding or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSide {
    X,
    Y,
    Both,
    None,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableSide::X => "x",
            TableSide::Y => "y",
            TableSide::Both => "both",
            TableSide::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// One component of a key.
///
/// Text and categorical values share the `Text` variant. Integral floats
/// within the exactly-representable range normalise to `Integer`, so `1`
/// and `1.0` compare equal the way a numeric merge compares them.
///
/// Parts serialize as bare scalars. JSON has no infinity, so non-finite
/// floats are written as `{"float": "inf"}` and read back unchanged.
#[derive(Debug, Clone)]
pub enum KeyPart {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl KeyPart {
    /// Convert a cell value into a key part. Missing values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Missing => None,
            Value::Text(s) | Value::Categorical(s) => Some(KeyPart::Text(s.clone())),
            Value::Integer(i) => Some(KeyPart::Integer(*i)),
            Value::Boolean(b) => Some(KeyPart::Boolean(*b)),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() <= MAX_EXACT_F64_INT {
                    Some(KeyPart::Integer(*f as i64))
                } else {
                    Some(KeyPart::Float(*f))
                }
            }
        }
    }

    /// The text of a `Text` part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyPart::Text(s) => Some(s),
            _ => None,
        }
    }

    fn float_bits(f: f64) -> u64 {
        // -0.0 and 0.0 are the same key.
        if f == 0.0 { 0 } else { f.to_bits() }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyPart::Boolean(a), KeyPart::Boolean(b)) => a == b,
            (KeyPart::Integer(a), KeyPart::Integer(b)) => a == b,
            (KeyPart::Float(a), KeyPart::Float(b)) => {
                Self::float_bits(*a) == Self::float_bits(*b)
            }
            (KeyPart::Text(a), KeyPart::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            KeyPart::Boolean(b) => b.hash(state),
            KeyPart::Integer(i) => i.hash(state),
            KeyPart::Float(f) => Self::float_bits(*f).hash(state),
            KeyPart::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Boolean(b) => write!(f, "{}", b),
            KeyPart::Integer(i) => write!(f, "{}", i),
            KeyPart::Float(v) => write!(f, "{}", v),
            KeyPart::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for KeyPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            KeyPart::Boolean(b) => serializer.serialize_bool(*b),
            KeyPart::Integer(i) => serializer.serialize_i64(*i),
            KeyPart::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            KeyPart::Float(f) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("float", &f.to_string())?;
                map.end()
            }
            KeyPart::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for KeyPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Boolean(bool),
            Integer(i64),
            Float(f64),
            Text(String),
            NonFinite { float: String },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Boolean(b) => KeyPart::Boolean(b),
            Repr::Integer(i) => KeyPart::Integer(i),
            Repr::Float(f) => KeyPart::Float(f),
            Repr::Text(s) => KeyPart::Text(s),
            Repr::NonFinite { float } => {
                let value: f64 = float.parse().map_err(|_| {
                    <D::Error as serde::de::Error>::custom(format!(
                        "invalid float key part '{}'",
                        float
                    ))
                })?;
                KeyPart::Float(value)
            }
        })
    }
}

/// A (possibly composite) join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<KeyPart>);

impl Key {
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Key(parts)
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Text of a single-column text key.
    pub fn as_single_text(&self) -> Option<&str> {
        match self.0.as_slice() {
            [part] => part.as_text(),
            _ => None,
        }
    }
}

impl From<KeyPart> for Key {
    fn from(part: KeyPart) -> Self {
        Key(vec![part])
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(vec![KeyPart::Text(s.to_string())])
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key(vec![KeyPart::Integer(i)])
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            parts => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

// Single-column keys serialize as their scalar, composite keys as arrays.
impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            parts => parts.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Many(Vec<KeyPart>),
            One(KeyPart),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Many(parts) => Key(parts),
            Repr::One(part) => Key(vec![part]),
        })
    }
}

/// Keys derived from one table, one entry per row (`None` = NA key).
#[derive(Debug, Clone)]
pub struct KeyVector {
    side: TableSide,
    columns: Vec<String>,
    keys: Vec<Option<Key>>,
}

impl KeyVector {
    pub fn side(&self) -> TableSide {
        self.side
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[Option<Key>] {
        &self.keys
    }

    /// Count occurrences of every present key.
    pub fn frequencies(&self) -> KeyFrequencies {
        let mut freq = KeyFrequencies::default();
        for key in &self.keys {
            match key {
                Some(k) => freq.add(k.clone()),
                None => freq.na_count += 1,
            }
        }
        freq
    }
}

/// Derive the key of every row of `table` from `columns`.
///
/// Fails with [`DiagnosticError::ColumnNotFound`] listing every absent
/// column, or [`DiagnosticError::InvalidInput`] if `columns` is empty.
pub fn derive_keys(table: &Table, columns: &[String], side: TableSide) -> Result<KeyVector> {
    if columns.is_empty() {
        return Err(DiagnosticError::InvalidInput(
            "at least one key column is required".to_string(),
        ));
    }

    let missing: Vec<String> = columns
        .iter()
        .filter(|name| table.column(name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(DiagnosticError::ColumnNotFound { side, missing });
    }

    let key_columns: Vec<_> = columns.iter().filter_map(|name| table.column(name)).collect();

    let keys = (0..table.height())
        .map(|row| {
            key_columns
                .iter()
                .map(|col| KeyPart::from_value(&col.values()[row]))
                .collect::<Option<Vec<_>>>()
                .map(Key)
        })
        .collect();

    Ok(KeyVector {
        side,
        columns: columns.to_vec(),
        keys,
    })
}

/// Occurrence counts of present keys, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct KeyFrequencies {
    order: Vec<Key>,
    counts: HashMap<Key, u64>,
    na_count: u64,
}

impl KeyFrequencies {
    /// Build from an iterator of optional keys.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Option<Key>>,
    {
        let mut freq = Self::default();
        for key in keys {
            match key {
                Some(k) => freq.add(k),
                None => freq.na_count += 1,
            }
        }
        freq
    }

    fn add(&mut self, key: Key) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.clone(), 1);
                self.order.push(key);
            }
        }
    }

    /// Occurrences of `key` (0 when absent).
    pub fn count(&self, key: &Key) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.counts.contains_key(key)
    }

    /// Distinct present keys.
    pub fn unique_count(&self) -> usize {
        self.order.len()
    }

    /// Rows whose key has a missing component.
    pub fn na_count(&self) -> u64 {
        self.na_count
    }

    /// Total rows, present and NA.
    pub fn row_count(&self) -> u64 {
        self.counts.values().sum::<u64>() + self.na_count
    }

    /// Distinct keys with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, u64)> + '_ {
        self.order.iter().map(move |k| (k, self.count(k)))
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> &[Key] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::text("a", vec![Some("1"), Some("1"), None, Some("2")]),
            Column::integer("b", vec![Some(1), Some(1), Some(3), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_derive_single_column_keys() {
        let keys = derive_keys(&table(), &["a".to_string()], TableSide::X).unwrap();
        assert_eq!(keys.keys().len(), 4);
        assert_eq!(keys.keys()[0], Some(Key::from("1")));
        assert_eq!(keys.keys()[2], None);
    }

    #[test]
    fn test_composite_key_missing_component_is_na() {
        let keys =
            derive_keys(&table(), &["a".to_string(), "b".to_string()], TableSide::X).unwrap();
        let freq = keys.frequencies();
        assert_eq!(freq.na_count(), 2);
        assert_eq!(freq.unique_count(), 1);
        assert_eq!(freq.row_count(), 4);
    }

    #[test]
    fn test_composite_keys_do_not_collide_across_boundaries() {
        let t = Table::new(vec![
            Column::text("a", vec![Some("ab"), Some("a")]),
            Column::text("b", vec![Some("c"), Some("bc")]),
        ])
        .unwrap();
        let keys = derive_keys(&t, &["a".to_string(), "b".to_string()], TableSide::X).unwrap();
        assert_ne!(keys.keys()[0], keys.keys()[1]);
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let err = derive_keys(
            &table(),
            &["a".to_string(), "zz".to_string(), "yy".to_string()],
            TableSide::Y,
        )
        .unwrap_err();
        match err {
            DiagnosticError::ColumnNotFound { side, missing } => {
                assert_eq!(side, TableSide::Y);
                assert_eq!(missing, vec!["zz".to_string(), "yy".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_key_columns_rejected() {
        assert!(matches!(
            derive_keys(&table(), &[], TableSide::X),
            Err(DiagnosticError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_integral_float_matches_integer() {
        assert_eq!(
            KeyPart::from_value(&Value::Float(3.0)),
            KeyPart::from_value(&Value::Integer(3))
        );
        assert_eq!(
            KeyPart::from_value(&Value::Float(-0.0)),
            KeyPart::from_value(&Value::Integer(0))
        );
        assert!(KeyPart::from_value(&Value::Float(f64::NAN)).is_none());
    }

    #[test]
    fn test_frequencies_first_seen_order() {
        let freq = KeyFrequencies::from_keys(vec![
            Some(Key::from("b")),
            Some(Key::from("a")),
            Some(Key::from("b")),
            None,
        ]);
        let seen: Vec<String> = freq.keys().iter().map(Key::to_string).collect();
        assert_eq!(seen, vec!["b", "a"]);
        assert_eq!(freq.count(&Key::from("b")), 2);
        assert_eq!(freq.count(&Key::from("zzz")), 0);
    }

    #[test]
    fn test_key_display_and_serialization() {
        let single = Key::from(7);
        assert_eq!(single.to_string(), "7");
        assert_eq!(serde_json::to_string(&single).unwrap(), "7");

        let composite = Key::new(vec![KeyPart::Text("a".into()), KeyPart::Integer(1)]);
        assert_eq!(composite.to_string(), "(a, 1)");
        let json = serde_json::to_string(&composite).unwrap();
        assert_eq!(json, r#"["a",1]"#);
        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, composite);
    }

    #[test]
    fn test_infinite_float_keys_survive_json() {
        let key = Key::new(vec![
            KeyPart::Float(f64::INFINITY),
            KeyPart::Float(f64::NEG_INFINITY),
            KeyPart::Float(1.5),
        ]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"[{"float":"inf"},{"float":"-inf"},1.5]"#);
        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);

        let single = Key::from(KeyPart::Float(f64::INFINITY));
        let back: Key = serde_json::from_str(&serde_json::to_string(&single).unwrap()).unwrap();
        assert_eq!(back, single);
    }
}
