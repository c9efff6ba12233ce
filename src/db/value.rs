//! Parameter and column value types
//!
//! `ParamValue` flows into a statement, `ColumnValue` flows out of one.
//! Neither ever borrows from a connection.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::timestamp;

// ==================
// Parameters
// ==================

/// A scalar bound to a named placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Text(String),
    Integer(i64),
    Numeric(f64),
    Date(NaiveDateTime),
    Binary(Vec<u8>),
}

impl ToSql for ParamValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ParamValue::Null => ToSqlOutput::Owned(Value::Null),
            ParamValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            ParamValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            ParamValue::Numeric(f) => ToSqlOutput::Owned(Value::Real(*f)),
            ParamValue::Date(d) => ToSqlOutput::Owned(Value::Text(timestamp::format_storage(d))),
            ParamValue::Binary(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Numeric(v)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(v: NaiveDateTime) -> Self {
        ParamValue::Date(v)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Binary(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// Named placeholder bindings for one statement
///
/// Names are stored without the leading `:`. Binding the same name twice is
/// recorded and the executor refuses the mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    bindings: Vec<(String, ParamValue)>,
    duplicate: Option<String>,
}

impl Params {
    /// An empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to placeholder `name`
    pub fn bind(mut self, name: impl AsRef<str>, value: impl Into<ParamValue>) -> Self {
        let name = strip_sigil(name.as_ref()).to_string();
        if self.get(&name).is_some() {
            self.duplicate.get_or_insert(name);
        } else {
            self.bindings.push((name, value.into()));
        }
        self
    }

    /// Look up a binding by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let name = strip_sigil(name);
        self.bindings
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Name of the first duplicated binding, if any
    pub fn duplicate(&self) -> Option<&str> {
        self.duplicate.as_deref()
    }
}

/// Placeholder name without its `:`, `@` or `$` prefix
pub(crate) fn strip_sigil(name: &str) -> &str {
    name.trim_start_matches([':', '@', '$'])
}

// ==================
// Columns
// ==================

/// A fully materialized column value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Text(String),
    Integer(i64),
    Numeric(f64),
    Binary(Vec<u8>),
    Date(NaiveDateTime),
}

impl ColumnValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Base64 rendering of a binary or text payload, `None` for anything else
    pub fn to_base64(&self) -> Option<String> {
        match self {
            ColumnValue::Binary(b) => Some(STANDARD.encode(b)),
            ColumnValue::Text(s) => Some(STANDARD.encode(s.as_bytes())),
            _ => None,
        }
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::Null => serializer.serialize_none(),
            ColumnValue::Text(s) => serializer.serialize_str(s),
            ColumnValue::Integer(i) => serializer.serialize_i64(*i),
            ColumnValue::Numeric(f) => serializer.serialize_f64(*f),
            ColumnValue::Binary(b) => serializer.serialize_str(&STANDARD.encode(b)),
            ColumnValue::Date(d) => serializer.serialize_str(&timestamp::format_boundary(d)),
        }
    }
}

/// A row whose values no longer depend on the connection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainRow {
    values: Vec<ColumnValue>,
}

impl PlainRow {
    pub fn new(values: Vec<ColumnValue>) -> Self {
        Self { values }
    }

    /// Column at position `index`
    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ColumnValue> {
        self.values
    }
}

impl Serialize for PlainRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}
