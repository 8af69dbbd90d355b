//! Canonical scalar value representation shared across records, snapshots,
//! and the property-write map handed to the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Typed property value tagged with explicit type information so the wire
/// format remains unambiguous across store drivers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
    /// Arbitrary binary payload.
    Bytes(Vec<u8>),
    /// Nanoseconds since Unix epoch in UTC.
    DateTime(i64),
    /// Ordered list of nested values.
    List(Vec<Value>),
    /// Nested string-keyed map of values.
    Map(BTreeMap<String, Value>),
}

/// Discriminant of a [`Value`], used by schema field declarations to
/// request a conversion at hydration time.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum ValueKind {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool,
    /// Signed 64-bit integer literal.
    Int,
    /// 64-bit floating point literal.
    Float,
    /// UTF-8 string literal.
    String,
    /// Arbitrary binary payload.
    Bytes,
    /// Nanoseconds since Unix epoch in UTC.
    DateTime,
    /// Ordered list of nested values.
    List,
    /// Nested string-keyed map of values.
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::DateTime => "datetime",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// True for the null literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts this value into the declared `kind`, applying the lossless
    /// coercions the schema layer supports. Null passes through untouched.
    pub(crate) fn coerce(self, kind: ValueKind, field: &str) -> Result<Value> {
        if self.kind() == kind || self.is_null() {
            return Ok(self);
        }
        match (self, kind) {
            (Value::Int(v), ValueKind::Float) => Ok(Value::Float(v as f64)),
            (Value::Int(v), ValueKind::DateTime) => Ok(Value::DateTime(v)),
            (Value::String(v), ValueKind::DateTime) => {
                v.parse::<i64>().map(Value::DateTime).map_err(|_| {
                    MappingError::Conversion {
                        field: field.to_owned(),
                        expected: kind,
                        found: ValueKind::String,
                    }
                })
            }
            (value, _) => Err(MappingError::Conversion {
                field: field.to_owned(),
                expected: kind,
                found: value.kind(),
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}
