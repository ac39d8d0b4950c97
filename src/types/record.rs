//! Attribute-addressable records built from portal JSON
//!
//! The portal has no schema, so every payload is kept as a [`Record`]: an
//! immutable, ordered mapping from field name to [`Field`]. Equality and
//! hashing cover the whole field set, which lets records serve as cache keys
//! (a lesson fetched twice is the same key twice).

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A restartable, cheaply clonable sequence of records
pub type Records = Arc<[Record]>;

static NULL: Field = Field::Null;

/// One value inside a [`Record`]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Field>),
    Record(Record),
}

/// Immutable mapping from field name to [`Field`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Field>,
}

impl Field {
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view; numeric strings count, the portal mixes both
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Field::Int(i) => Some(*i),
            Field::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Int(i) => Some(*i as f64),
            Field::Float(f) => Some(*f),
            Field::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Field::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Empty list, empty record, empty text or null
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Null => true,
            Field::Text(s) => s.is_empty(),
            Field::List(items) => items.is_empty(),
            Field::Record(r) => r.is_empty(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Field::Null => Value::Null,
            Field::Bool(b) => Value::Bool(*b),
            Field::Int(i) => Value::from(*i),
            Field::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Field::Text(s) => Value::String(s.clone()),
            Field::List(items) => Value::Array(items.iter().map(Field::to_json).collect()),
            Field::Record(r) => r.to_json(),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Field::Null,
            Value::Bool(b) => Field::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Field::Int(i),
                None => Field::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Field::Text(s),
            Value::Array(items) => Field::List(items.into_iter().map(Field::from).collect()),
            Value::Object(map) => Field::Record(Record {
                fields: map.into_iter().map(|(k, v)| (k, Field::from(v))).collect(),
            }),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Field::Null, Field::Null) => true,
            (Field::Bool(a), Field::Bool(b)) => a == b,
            (Field::Int(a), Field::Int(b)) => a == b,
            // Bitwise, so that Eq stays reflexive and agrees with Hash
            (Field::Float(a), Field::Float(b)) => a.to_bits() == b.to_bits(),
            (Field::Text(a), Field::Text(b)) => a == b,
            (Field::List(a), Field::List(b)) => a == b,
            (Field::Record(a), Field::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Field::Null => {}
            Field::Bool(b) => b.hash(state),
            Field::Int(i) => i.hash(state),
            Field::Float(f) => f.to_bits().hash(state),
            Field::Text(s) => s.hash(state),
            Field::List(items) => items.hash(state),
            Field::Record(r) => r.hash(state),
        }
    }
}

/// Form encoding: text verbatim, numbers as written, lists comma-joined
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Null => Ok(()),
            Field::Bool(b) => write!(f, "{}", b),
            Field::Int(i) => write!(f, "{}", i),
            Field::Float(x) => write!(f, "{}", x),
            Field::Text(s) => f.write_str(s),
            Field::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Field::Record(r) => write!(f, "{}", r.to_json()),
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used where records are assembled by hand
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), Field::from(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Like [`Record::get`] but a missing field is an error
    pub fn require(&self, key: &str) -> Result<&Field> {
        self.fields.get(key).ok_or_else(|| Error::missing_field(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Field::as_str)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Field::as_i64)
    }

    pub fn record(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Field::as_record)
    }

    pub fn list(&self, key: &str) -> Option<&[Field]> {
        self.get(key).and_then(Field::as_list)
    }

    /// Nested records of a list field; non-record items are skipped
    pub fn records<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Record> + use<'a> {
        self.list(key)
            .unwrap_or_default()
            .iter()
            .filter_map(Field::as_record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Convert into a typed struct when the caller knows the shape
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match Field::from(value) {
            Field::Record(record) => Ok(record),
            other => Err(Error::payload(format!(
                "expected a JSON object, got {}",
                other.to_json()
            ))),
        }
    }
}

/// Missing fields index to [`Field::Null`], like `serde_json::Value`
impl std::ops::Index<&str> for Record {
    type Output = Field;

    fn index(&self, key: &str) -> &Field {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Field);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Wrap every element of a JSON array as a record
pub fn records_from_rows(rows: Vec<Value>) -> Result<Records> {
    rows.into_iter()
        .map(Record::try_from)
        .collect::<Result<Vec<_>>>()
        .map(Records::from)
}
