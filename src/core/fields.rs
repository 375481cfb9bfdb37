//! Structured fields attached to log records
//!
//! This module provides:
//! - `FieldValue`: a typed value carried by a field or a message argument
//! - `Fields`: an unordered string-keyed bag of field values
//! - the names of the fields the facade reserves for itself

use super::timestamp::format_field_time;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

/// Monotonic per-adapter sequence number, attached to every emitted record
pub const FIELD_SEQUENCE_NUMBER: &str = "sequenceNumber";

/// Source location of the logging call, as `dir/file.rs:LINE`
pub const FIELD_CALLER: &str = "caller";

/// Original level of a message re-emitted by a replay journal
pub const FIELD_REPLAY: &str = "replayed-from-level";

/// Number of duplicates suppressed by a rollup window
pub const FIELD_ROLLUP: &str = "rollup-count";

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    /// Replaced by its string rendering before a record reaches a sink
    Time(DateTime<FixedOffset>),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Time(t) => write!(f, "{}", format_field_time(t)),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::UInt(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.iter().map(FieldValue::to_json_value).collect())
            }
            FieldValue::Time(t) => serde_json::Value::String(format_field_time(t)),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Replace a time value by its fixed string rendering
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            FieldValue::Time(t) => FieldValue::String(format_field_time(&t)),
            FieldValue::List(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::normalized).collect())
            }
            other => other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UInt(u) => Some(*u),
            FieldValue::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(t: DateTime<FixedOffset>) -> Self {
        FieldValue::Time(t)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Time(t.fixed_offset())
    }
}

impl From<SystemTime> for FieldValue {
    fn from(t: SystemTime) -> Self {
        FieldValue::from(DateTime::<Utc>::from(t))
    }
}

impl From<super::log_level::LogLevel> for FieldValue {
    fn from(level: super::log_level::LogLevel) -> Self {
        FieldValue::String(level.to_str().to_string())
    }
}

/// Unordered key-value fields for structured logging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields {
    fields: HashMap<String, FieldValue>,
}

impl Fields {
    /// Create a new empty field set
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Add a field (builder version)
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field (mutable version)
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Clone `self`, then overlay `other` on the clone.
    ///
    /// Keys present in both take the value from `other`; `self` is untouched.
    #[must_use]
    pub fn concat(&self, other: &Fields) -> Fields {
        let mut merged = self.clone();
        for (key, value) in &other.fields {
            merged.fields.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Render every time-valued field with the fixed field time format
    #[must_use]
    pub fn normalize_time_values(self) -> Self {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(k, v)| (k, v.normalized()))
                .collect(),
        }
    }

    /// Entries sorted by key
    pub fn sorted(&self) -> Vec<(&String, &FieldValue)> {
        let mut entries: Vec<_> = self.fields.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Format fields as key=value pairs, sorted by key
    pub fn format_fields(&self) -> String {
        self.sorted()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl From<HashMap<String, FieldValue>> for Fields {
    fn from(fields: HashMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = hash_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = hash_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timestamp::parse_field_time;
    use chrono::TimeZone;

    #[test]
    fn test_fields_creation() {
        let fields = Fields::new();
        assert!(fields.is_empty());

        let fields = Fields::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("username"), Some(&FieldValue::from("john_doe")));
    }

    #[test]
    fn test_concat_right_biased() {
        let scoped = Fields::new().with_field("a", 1).with_field("b", "kept");
        let call_site = Fields::new().with_field("a", 2);

        let merged = scoped.concat(&call_site);
        assert_eq!(merged.get("a"), Some(&FieldValue::Int(2)));
        assert_eq!(merged.get("b"), Some(&FieldValue::from("kept")));

        // Left operand untouched
        assert_eq!(scoped.get("a"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_normalize_time_values() {
        let t1 = Utc.timestamp_opt(1_503_939_881, 0).single().expect("valid");
        let t2 = Utc.timestamp_opt(1_503_939_891, 0).single().expect("valid");
        let fields = Fields::new()
            .with_field("foo", "bar")
            .with_field("bar", t1)
            .with_field("baz", t2)
            .with_field("bonk", vec![true, false, true])
            .normalize_time_values();

        // Non-time values remain the same
        assert_eq!(fields.get("foo"), Some(&FieldValue::from("bar")));
        assert_eq!(
            fields.get("bonk"),
            Some(&FieldValue::from(vec![true, false, true]))
        );

        // Times converted to the field time format
        let rendered = fields.get("bar").and_then(FieldValue::as_str).expect("string");
        assert_eq!(parse_field_time(rendered).expect("parse"), t1);
        let rendered = fields.get("baz").and_then(FieldValue::as_str).expect("string");
        assert_eq!(parse_field_time(rendered).expect("parse"), t2);
    }

    #[test]
    fn test_normalize_empty_fields() {
        assert!(Fields::new().normalize_time_values().is_empty());
    }

    #[test]
    fn test_format_fields_sorted() {
        let fields = Fields::new().with_field("zeta", 1).with_field("alpha", "x");
        assert_eq!(fields.format_fields(), "alpha=x zeta=1");
    }

    #[test]
    fn test_from_iterator() {
        let fields: Fields = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("b"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_json_value_conversion() {
        assert_eq!(FieldValue::UInt(7).to_json_value(), serde_json::json!(7));
        assert_eq!(
            FieldValue::from(vec!["a", "b"]).to_json_value(),
            serde_json::json!(["a", "b"])
        );
        assert_eq!(FieldValue::Float(f64::NAN).to_json_value(), serde_json::Value::Null);
    }
}
