// src/database/value.rs
// Ordered row maps and value rendering shared by the reader, writer and session

use base64::Engine as _;
use rusqlite::types::Value;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Key used to carry blob payloads through JSON text.
pub const BLOB_JSON_KEY: &str = "$blob";

/// Column name → value mapping that keeps insertion order.
///
/// Used for fetched rows, primary-key projections (`RowKey`) and restricting
/// values alike. Iteration order is the order columns were inserted, which the
/// clause builder relies on to bind parameters deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowData {
    entries: Vec<(String, Value)>,
}

/// A primary-key projection identifying one row.
pub type RowKey = RowData;

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Set a column, replacing an existing entry in place or appending a new one.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Project onto `columns`, in that order. Missing columns become NULL.
    pub fn pick<S: AsRef<str>>(&self, columns: &[S]) -> RowData {
        columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                let value = self.get(column).cloned().unwrap_or(Value::Null);
                (column.to_string(), value)
            })
            .collect()
    }

    /// Rename keys following `(from, to)` pairs; only the renamed entries are kept.
    pub fn rekey<A: AsRef<str>, B: AsRef<str>>(&self, pairs: &[(A, B)]) -> RowData {
        pairs
            .iter()
            .map(|(from, to)| {
                let value = self.get(from.as_ref()).cloned().unwrap_or(Value::Null);
                (to.as_ref().to_string(), value)
            })
            .collect()
    }

    /// Overlay every entry of `other` onto `self`.
    pub fn merge(&mut self, other: RowData) {
        for (column, value) in other.entries {
            self.insert(column, value);
        }
    }

    pub fn all_null(&self) -> bool {
        self.values().all(|value| matches!(value, Value::Null))
    }

    /// Structural equality independent of entry order.
    pub fn same_entries(&self, other: &RowData) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut left: Vec<_> = self.iter().collect();
        let mut right: Vec<_> = other.iter().collect();
        left.sort_by(|a, b| a.0.cmp(b.0));
        right.sort_by(|a, b| a.0.cmp(b.0));
        left.iter()
            .zip(right.iter())
            .all(|(a, b)| a.0 == b.0 && values_equal(a.1, b.1))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<RowData> {
        serde_json::from_str(text)
    }
}

impl FromIterator<(String, Value)> for RowData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = RowData::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl IntoIterator for RowData {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Equality used when matching keys: integers and reals compare numerically.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Real(y)) | (Value::Real(y), Value::Integer(x)) => {
            (*x as f64).partial_cmp(y) == Some(Ordering::Equal)
        }
        _ => a == b,
    }
}

/// Human-readable rendering used in summaries and prompts.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<{}-byte blob>", b.len()),
    }
}

struct JsonCell<'a>(&'a Value);

impl Serialize for JsonCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Blob(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    BLOB_JSON_KEY,
                    &base64::engine::general_purpose::STANDARD.encode(b),
                )?;
                map.end()
            }
        }
    }
}

impl Serialize for RowData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &JsonCell(value))?;
        }
        map.end()
    }
}

/// Convert one parsed JSON value back into a SQLite value.
pub fn value_from_json(json: serde_json::Value) -> Result<Value, String> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Object(map) if map.len() == 1 && map.contains_key(BLOB_JSON_KEY) => {
            match map.get(BLOB_JSON_KEY) {
                Some(serde_json::Value::String(encoded)) => Value::Blob(
                    base64::engine::general_purpose::STANDARD
                        .decode(encoded)
                        .map_err(|e| format!("invalid base64 in {}: {}", BLOB_JSON_KEY, e))?,
                ),
                _ => return Err(format!("{} must hold a base64 string", BLOB_JSON_KEY)),
            }
        }
        nested => Value::Text(nested.to_string()),
    })
}

impl<'de> Deserialize<'de> for RowData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RowData;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping column names to values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<RowData, M::Error> {
                let mut row = RowData::new();
                while let Some((column, json)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    let value = value_from_json(json).map_err(de::Error::custom)?;
                    row.insert(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, Value)]) -> RowData {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut r = row(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]);
        r.insert("a", Value::Integer(9));
        r.insert("c", Value::Null);
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(r.get("a"), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_pick_and_rekey() {
        let r = row(&[
            ("id", Value::Integer(1)),
            ("name", Value::Text("x".into())),
            ("owner", Value::Integer(4)),
        ]);
        assert_eq!(
            r.pick(&["owner", "id"]).columns().collect::<Vec<_>>(),
            vec!["owner", "id"]
        );
        let parent_key = r.rekey(&[("owner", "person_id")]);
        assert_eq!(parent_key, row(&[("person_id", Value::Integer(4))]));
        assert_eq!(r.pick(&["missing"]).get("missing"), Some(&Value::Null));
    }

    #[test]
    fn test_same_entries_ignores_order() {
        let a = row(&[("x", Value::Integer(1)), ("y", Value::Text("q".into()))]);
        let b = row(&[("y", Value::Text("q".into())), ("x", Value::Real(1.0))]);
        let c = row(&[("y", Value::Text("q".into())), ("x", Value::Integer(2))]);
        assert!(a.same_entries(&b));
        assert!(!a.same_entries(&c));
        assert!(!a.same_entries(&row(&[("x", Value::Integer(1))])));
    }

    #[test]
    fn test_json_keeps_column_order_and_blobs() {
        let r = row(&[
            ("zeta", Value::Integer(3)),
            ("alpha", Value::Text("a/b".into())),
            ("data", Value::Blob(vec![0, 1, 2])),
            ("score", Value::Real(1.5)),
            ("gone", Value::Null),
        ]);
        let text = r.to_json_pretty().unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        let back = RowData::from_json(&text).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_json_booleans_and_nested_values() {
        let back = RowData::from_json(r#"{"flag": true, "tags": [1, 2]}"#).unwrap();
        assert_eq!(back.get("flag"), Some(&Value::Integer(1)));
        assert_eq!(back.get("tags"), Some(&Value::Text("[1,2]".into())));
        assert!(RowData::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Null), "null");
        assert_eq!(render_value(&Value::Integer(7)), "7");
        assert_eq!(render_value(&Value::Blob(vec![1; 4])), "<4-byte blob>");
    }
}
