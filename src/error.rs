use thiserror::Error;

use crate::filter::Operator;

/// Errors raised while translating filter, sort and pagination input into HQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HqlError {
    #[error("unknown entity type `{0}`")]
    UnknownType(String),

    #[error("field `{field}` is not defined on `{entity}`")]
    UnknownField { entity: String, field: String },

    #[error("{builder} does not support {operation}")]
    UnsupportedOperation {
        builder: &'static str,
        operation: &'static str,
    },

    #[error("cannot coerce {value} to {target}")]
    Coercion { value: String, target: String },

    #[error("operator {operator} on `{path}` requires at least one value")]
    MissingOperand { operator: Operator, path: String },

    #[error("instance of `{entity}` has no value for identifier `{field}`")]
    MissingIdentifier { entity: String, field: String },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("generated query failed literal audit: {0}")]
    Audit(String),
}

pub type Result<T> = std::result::Result<T, HqlError>;
