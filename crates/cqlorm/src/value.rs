//! Untyped parameter values and ordered property bags.
//!
//! A [`Value`] is either inlined into the statement text (literal mode) or
//! handed to the execution backend in the parameter list. [`Value::Expr`] is
//! the exception: it is raw CQL and always inlined.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

/// A statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
    List(Vec<Value>),
    /// Raw CQL expression (e.g. `now()`, `count + 1`). Never parameterized.
    Expr(String),
}

impl Value {
    /// A raw CQL expression, inlined verbatim in every parameter mode.
    pub fn expr(cql: impl Into<String>) -> Self {
        Value::Expr(cql.into())
    }

    /// A blob value (`Vec<u8>` converts to a list of integers otherwise).
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Blob(bytes.into())
    }

    /// Whether this value is a raw expression.
    pub fn is_expr(&self) -> bool {
        matches!(self, Value::Expr(_))
    }

    /// Render as a CQL literal.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    pub(crate) fn write_literal(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => {
                if f.is_nan() {
                    out.push_str("NaN");
                } else if f.is_infinite() {
                    out.push_str(if *f > 0.0 { "Infinity" } else { "-Infinity" });
                } else {
                    let _ = write!(out, "{f}");
                }
            }
            Value::Text(s) => {
                out.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        out.push_str("''");
                    } else {
                        out.push(ch);
                    }
                }
                out.push('\'');
            }
            Value::Uuid(u) => {
                let _ = write!(out, "{u}");
            }
            Value::Timestamp(ts) => {
                out.push('\'');
                out.push_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true));
                out.push('\'');
            }
            Value::Blob(bytes) => {
                out.push_str("0x");
                for b in bytes {
                    let _ = write!(out, "{b:02x}");
                }
            }
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out);
                }
                out.push(']');
            }
            Value::Expr(cql) => out.push_str(cql),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered `name -> value` bag.
///
/// Used for INSERT values, UPDATE assignments and entity snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropBag {
    entries: Vec<(String, Value)>,
}

impl PropBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Chainable insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the entries whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(k, _)| keep(k));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn literal_text_escapes_quotes() {
        assert_eq!(Value::from("it's").to_literal(), "'it''s'");
    }

    #[test]
    fn literal_scalars() {
        assert_eq!(Value::from(42i32).to_literal(), "42");
        assert_eq!(Value::from(1.5f64).to_literal(), "1.5");
        assert_eq!(Value::from(true).to_literal(), "true");
        assert_eq!(Value::from(None::<i32>).to_literal(), "null");
    }

    #[test]
    fn literal_timestamp_and_blob() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::from(ts).to_literal(), "'2024-01-02T03:04:05.000Z'");
        assert_eq!(Value::blob(vec![0xca, 0xfe]).to_literal(), "0xcafe");
    }

    #[test]
    fn literal_list() {
        assert_eq!(Value::from(vec!["a", "b"]).to_literal(), "['a', 'b']");
    }

    #[test]
    fn expr_is_verbatim() {
        assert_eq!(Value::expr("now()").to_literal(), "now()");
    }

    #[test]
    fn prop_bag_keeps_insertion_order_on_replace() {
        let mut bag = PropBag::new().with("b", 1).with("a", 2);
        bag.insert("b", 3);
        let names: Vec<_> = bag.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(bag.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::from(1), Value::from("x"), Value::Null]).unwrap();
        assert_eq!(json, r#"[1,"x",null]"#);
    }
}
