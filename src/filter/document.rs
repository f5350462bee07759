//! Serialized filter form accepted from the command line.
//!
//! ```json
//! {"or": [
//!     {"predicate": {"path": "books.chapters.title", "op": "in", "values": ["ABC", "DEF"]}},
//!     {"predicate": {"path": "books.publisher.name", "op": "in", "values": ["Pub1"]}}
//! ]}
//! ```
//!
//! Paths are dotted and relative to the queried type; they are resolved
//! against the dictionary when the document is turned into an expression.

use serde::{Deserialize, Serialize};

use super::expression::FilterExpression;
use super::operator::Operator;
use super::path::{Path, TypeName};
use super::predicate::FilterPredicate;
use super::value::Value;
use crate::db::EntityDictionary;
use crate::error::{HqlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDocument {
    And(Vec<FilterDocument>),
    Or(Vec<FilterDocument>),
    Not(Box<FilterDocument>),
    Predicate(PredicateDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateDocument {
    pub path: String,
    pub op: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl FilterDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HqlError::InvalidFilter(e.to_string()))
    }

    /// Resolve every dotted path from `root` and build the expression tree.
    pub fn resolve<D>(&self, root: &TypeName, dictionary: &D) -> Result<FilterExpression>
    where
        D: EntityDictionary + ?Sized,
    {
        match self {
            FilterDocument::And(items) => {
                let exprs = Self::resolve_all(items, root, dictionary)?;
                FilterExpression::conjunction(exprs)
                    .ok_or_else(|| HqlError::InvalidFilter("empty `and` group".into()))
            }
            FilterDocument::Or(items) => {
                let exprs = Self::resolve_all(items, root, dictionary)?;
                FilterExpression::disjunction(exprs)
                    .ok_or_else(|| HqlError::InvalidFilter("empty `or` group".into()))
            }
            FilterDocument::Not(inner) => {
                Ok(FilterExpression::negate(inner.resolve(root, dictionary)?))
            }
            FilterDocument::Predicate(p) => {
                let path = Path::parse(root, &p.path, dictionary)?;
                Ok(FilterPredicate::new(path, p.op, p.values.clone()).into())
            }
        }
    }

    fn resolve_all<D>(
        items: &[FilterDocument],
        root: &TypeName,
        dictionary: &D,
    ) -> Result<Vec<FilterExpression>>
    where
        D: EntityDictionary + ?Sized,
    {
        items
            .iter()
            .map(|item| item.resolve(root, dictionary))
            .collect()
    }
}
