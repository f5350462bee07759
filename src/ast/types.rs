//! HQL statement model.
//!
//! The builders assemble one of these and hand it to the compiler for the
//! exact text the query handle receives, or to the formatter for display.
//! Predicate fragments arrive already rendered (alias path, operator keyword
//! and parameter placeholder); the model only keeps their boolean structure.

use crate::filter::TypeName;
use crate::request::SortOrder;

#[derive(Debug, Clone, PartialEq)]
pub enum HqlStatement {
    /// `SELECT ... FROM <entity> AS <alias> ...` over a root entity.
    Select(SelectStatement),
    /// WHERE/ORDER BY evaluated against an already-loaded collection.
    CollectionFilter(CollectionFilter),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub entity: TypeName,
    pub alias: String,
    pub joins: Vec<JoinFragment>,
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderTerm>,
}

impl SelectStatement {
    /// `SELECT <alias> FROM <entity> AS <alias>` with nothing else attached.
    pub fn entity(entity: &TypeName) -> Self {
        let alias = entity.alias();
        Self {
            projection: Projection::Entity(alias.clone()),
            entity: entity.clone(),
            alias,
            joins: Vec::new(),
            filter: None,
            order_by: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// The aliased root entity itself.
    Entity(String),
    /// `COUNT(DISTINCT <alias>)`.
    CountDistinct(String),
}

/// `JOIN <source>.<field> <alias>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinFragment {
    pub source: String,
    pub field: String,
    pub alias: String,
}

/// Boolean structure of a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// One rendered predicate fragment.
    Comparison(String),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

/// `<field> asc|desc`, the field already carrying any alias prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionFilter {
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderTerm>,
}
