use std::fmt;

use serde::{Deserialize, Serialize};

use super::operator::{escape_like, Operator};
use super::path::{Path, PathElement};
use super::value::Value;
use crate::error::{HqlError, Result};

/// A value ready to be handed to a query handle under a parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Single(Value),
    List(Vec<Value>),
}

/// A single comparison: `path operator values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    path: Path,
    operator: Operator,
    values: Vec<Value>,
}

impl FilterPredicate {
    pub fn new(path: Path, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            path,
            operator,
            values,
        }
    }

    /// Predicate over a one-hop path.
    pub fn on_element(element: PathElement, operator: Operator, values: Vec<Value>) -> Self {
        Self::new(Path::single(element), operator, values)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Same comparison rooted one hop higher, through `element`.
    pub fn prefixed(&self, element: PathElement) -> Result<Self> {
        Ok(Self {
            path: self.path.prefixed(element)?,
            operator: self.operator,
            values: self.values.clone(),
        })
    }

    /// The value this predicate binds, or `None` for operators rendered inline.
    pub fn bound_value(&self) -> Result<Option<BoundValue>> {
        if !self.operator.is_parameterized() {
            return Ok(None);
        }
        let first = self.values.first().ok_or_else(|| HqlError::MissingOperand {
            operator: self.operator,
            path: self.path.field_path(),
        })?;

        let bound = if self.operator.is_list_valued() {
            let values = if self.operator.is_case_insensitive() {
                self.values.iter().map(Value::to_lowercase).collect()
            } else {
                self.values.clone()
            };
            BoundValue::List(values)
        } else if self.operator.is_matching() {
            BoundValue::Single(Value::Text(escape_like(&first.to_string())))
        } else {
            BoundValue::Single(first.clone())
        };
        Ok(Some(bound))
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "{} {} [{}]",
            self.path.field_path(),
            self.operator,
            values.join(", ")
        )
    }
}
