//! The dynamic field value type used in filter and data maps.
//!
//! Callers describe queries as plain key/value maps; [`FieldValue`] is the
//! runtime representation of the value side. `From` impls for the natural
//! Rust types keep call sites terse, and the [`fields!`](crate::fields)
//! macro builds whole maps inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A filter or data map: column/filter key to dynamic value.
///
/// `BTreeMap` keeps iteration order deterministic, so two calls with the
/// same map always produce the same SQL text.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A dynamically typed value bound to a column.
///
/// `List` is only meaningful as the top-level value of a sequence lookup
/// (`in`, `not_in`, `not_like_all`); nested lists are a shape error caught
/// by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The null / absence marker.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A UUID value.
    Uuid(Uuid),
    /// A timestamp value (UTC).
    Timestamp(DateTime<Utc>),
    /// A structured JSON value.
    Json(serde_json::Value),
    /// An ordered sequence of values, for set lookups.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Whether this value is the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is a sequence.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// A short name for the runtime type, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Timestamp(_) => "timestamp",
            Self::Json(_) => "json",
            Self::List(_) => "sequence",
        }
    }

    /// Coerce the value to its text form, as used by the pattern-matching
    /// lookups (`like`, `ilike`, ...). Strings are taken verbatim, other
    /// scalars are rendered; null becomes the empty string.
    pub fn coerce_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Uuid(u) => u.to_string(),
            Self::Timestamp(t) => t.to_rfc3339(),
            Self::Json(j) => j.to_string(),
            Self::List(_) => String::new(),
        }
    }

    /// Return the integer payload, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Return the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        Self::Integer(v.into())
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Build a [`FieldMap`] inline.
///
/// ```
/// use tablekit_core::fields;
///
/// let filters = fields! {
///     "age__gte" => 21,
///     "email__ilike" => "@example.com",
/// };
/// assert_eq!(filters.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::types::FieldMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::types::FieldMap::new();
        $(
            map.insert(($key).to_string(), $crate::types::FieldValue::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_impls() {
        assert_eq!(FieldValue::from(42i64), FieldValue::Integer(42));
        assert_eq!(FieldValue::from(7i32), FieldValue::Integer(7));
        assert_eq!(FieldValue::from(true), FieldValue::Boolean(true));
        assert_eq!(
            FieldValue::from("hi"),
            FieldValue::String("hi".to_string())
        );
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(
            FieldValue::from(vec![1i64, 2]),
            FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)])
        );
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(FieldValue::Integer(5).coerce_text(), "5");
        assert_eq!(FieldValue::from("abc").coerce_text(), "abc");
        assert_eq!(FieldValue::Boolean(false).coerce_text(), "false");
        assert_eq!(FieldValue::Null.coerce_text(), "");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FieldValue::Null.kind_name(), "null");
        assert_eq!(FieldValue::from(vec![1i64]).kind_name(), "sequence");
        assert_eq!(
            FieldValue::Json(serde_json::json!({"a": 1})).kind_name(),
            "json"
        );
    }

    #[test]
    fn test_fields_macro() {
        let map = fields! {
            "email" => "a@x.com",
            "age__gte" => 21,
            "role__in" => vec!["admin", "staff"],
        };
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.get("email"),
            Some(&FieldValue::String("a@x.com".to_string()))
        );
        assert!(map.get("role__in").is_some_and(FieldValue::is_list));
    }

    #[test]
    fn test_serde_untagged() {
        let v: FieldValue = serde_json::from_str("\"hello\"").expect("deserialize");
        assert_eq!(v, FieldValue::String("hello".to_string()));
        let v: FieldValue = serde_json::from_str("true").expect("deserialize");
        assert_eq!(v, FieldValue::Boolean(true));
    }
}
