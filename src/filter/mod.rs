//! Filter model: paths, operators, predicates and the expression tree.
//!
//! Everything here is plain data. Nothing in this module knows about query
//! text beyond the fragment each operator renders for a single field.

pub mod document;
pub mod expression;
pub mod operator;
pub mod path;
pub mod predicate;
pub mod value;

pub use document::{FilterDocument, PredicateDocument};
pub use expression::FilterExpression;
pub use operator::{escape_like, Operator};
pub use path::{Path, PathElement, TypeName};
pub use predicate::{BoundValue, FilterPredicate};
pub use value::{coerce, Value, ValueType};
