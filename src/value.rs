//! Parameter and attribute values
//!
//! Symphony stores protocol parameters, epoch overrides and stimulus settings as a
//! loose mix of numbers, strings and small arrays. The same shapes end up as
//! attributes in the output container, so one [`Value`] type serves both sides.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named parameters of a protocol, epoch or stimulus (sorted by key)
pub type Parameters = BTreeMap<String, Value>;

/// A single parameter or attribute value
///
/// Serialized untagged so JSON exports stay readable: `1` is an integer,
/// `1.0` a float, `[1, 2]` an integer array. An empty array has no element to
/// tell the two array kinds apart and always reads back as `IntArray`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// Free text
    Text(String),
    /// Integer array (e.g. sample indices)
    IntArray(Vec<i64>),
    /// Floating-point array
    FloatArray(Vec<f64>),
}

impl Value {
    /// Numeric view of the value; integers widen to `f64`, everything else is `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// False for NaN or infinite floats, including inside float arrays
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(v) => v.is_finite(),
            Value::FloatArray(v) => v.iter().all(|x| x.is_finite()),
            _ => true,
        }
    }

    /// Short type label used in reports and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::IntArray(_) => "int[]",
            Value::FloatArray(_) => "float[]",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::IntArray(v) => write!(f, "{:?}", v),
            Value::FloatArray(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
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

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntArray(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatArray(v)
    }
}
