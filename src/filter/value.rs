//! Operand values carried by filter predicates.
//!
//! Values are untyped at the filter layer. The only place they are coerced to
//! a native type is the owner-id predicate synthesized by the page-totals
//! builder, which has to match the identifier field's declared type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HqlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lower-case text values; other values pass through untouched.
    pub fn to_lowercase(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(s.to_lowercase()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Native type of an attribute, as declared in the entity dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Long,
    Integer,
    Float,
    Boolean,
    String,
}

impl ValueType {
    pub fn label(&self) -> &'static str {
        match self {
            ValueType::Long => "long",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Convert a raw value into the representation of `target`.
pub fn coerce(value: &Value, target: ValueType) -> Result<Value> {
    let fail = || HqlError::Coercion {
        value: format!("{:?}", value),
        target: target.to_string(),
    };

    match (target, value) {
        (_, Value::Null) => Err(fail()),

        (ValueType::Long, Value::Int(i)) => Ok(Value::Int(*i)),
        (ValueType::Integer, Value::Int(i)) => i32::try_from(*i)
            .map(|_| Value::Int(*i))
            .map_err(|_| fail()),
        (ValueType::Long | ValueType::Integer, Value::Float(v)) => {
            if v.fract() == 0.0 && v.is_finite() {
                coerce(&Value::Int(*v as i64), target)
            } else {
                Err(fail())
            }
        }
        (ValueType::Long | ValueType::Integer, Value::Text(s)) => {
            let parsed = s.trim().parse::<i64>().map_err(|_| fail())?;
            coerce(&Value::Int(parsed), target)
        }
        (ValueType::Long | ValueType::Integer, Value::Bool(_)) => Err(fail()),

        (ValueType::Float, Value::Float(v)) => Ok(Value::Float(*v)),
        (ValueType::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
        (ValueType::Float, Value::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| fail()),
        (ValueType::Float, Value::Bool(_)) => Err(fail()),

        (ValueType::Boolean, Value::Bool(b)) => Ok(Value::Bool(*b)),
        (ValueType::Boolean, Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
        (ValueType::Boolean, _) => Err(fail()),

        (ValueType::String, other) => Ok(Value::Text(other.to_string())),
    }
}
