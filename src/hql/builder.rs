//! Shared builder surface.
//!
//! All three builders follow the same lifecycle: construct, configure any
//! number of times in any order (last write per option wins), then `build()`.
//! Configuration they cannot honor fails at the configuration call.

use tracing::debug;

use crate::ast::{audit_literals, compile, HqlStatement};
use crate::config::EngineConfig;
use crate::db::{Instance, QueryHandle};
use crate::error::Result;
use crate::filter::{BoundValue, FilterExpression, PathElement, TypeName};
use crate::request::{Pagination, Sorting};

use super::clauses::apply_pagination;

/// A query builder over one query shape.
pub trait QueryBuilder: Sized {
    /// What `build()` hands back.
    type Output;

    /// Name used in logs and unsupported-operation errors.
    fn name(&self) -> &'static str;

    fn with_filter(self, filter: Option<FilterExpression>) -> Self;

    fn with_sort(self, sorting: Option<Sorting>) -> Result<Self>;

    fn with_pagination(self, pagination: Option<Pagination>) -> Result<Self>;

    fn with_config(self, config: &EngineConfig) -> Self;

    /// Render the query and hand it to the session with parameters bound.
    fn build(&self) -> Result<Self::Output>;
}

/// Filter, sort and pagination as configured so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuilderState {
    pub filter: Option<FilterExpression>,
    pub sorting: Option<Sorting>,
    pub pagination: Option<Pagination>,
}

impl BuilderState {
    /// Whether anything that needs a query was configured. A default sort
    /// does not count.
    pub fn is_configured(&self) -> bool {
        self.filter.is_some()
            || self.sorting.as_ref().is_some_and(|s| !s.is_default())
            || self.pagination.is_some()
    }
}

/// One concrete relationship instance, e.g. author #3's `books`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub parent_type: TypeName,
    pub child_type: TypeName,
    pub name: String,
    pub parent: Instance,
    pub children: Vec<Instance>,
}

impl Relationship {
    pub fn new(
        parent_type: impl Into<TypeName>,
        child_type: impl Into<TypeName>,
        name: &str,
        parent: Instance,
        children: Vec<Instance>,
    ) -> Self {
        Self {
            parent_type: parent_type.into(),
            child_type: child_type.into(),
            name: name.to_string(),
            parent,
            children,
        }
    }

    /// The relationship field as a path element on the parent type.
    pub fn element(&self) -> PathElement {
        PathElement::new(self.parent_type.clone(), self.child_type.clone(), &self.name)
    }
}

/// Result of the sub-collection fetch builder.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionFetch<Q> {
    /// No query needed; the already-loaded collection is the answer.
    UseLoaded,
    Query(Q),
}

impl<Q> CollectionFetch<Q> {
    pub fn is_query(&self) -> bool {
        matches!(self, CollectionFetch::Query(_))
    }

    pub fn into_query(self) -> Option<Q> {
        match self {
            CollectionFetch::Query(q) => Some(q),
            CollectionFetch::UseLoaded => None,
        }
    }
}

/// Compile `statement`, auditing the text when configured. Runs before the
/// session sees anything, so a failed build never creates a query.
pub(crate) fn statement_text(
    builder: &str,
    statement: &HqlStatement,
    config: &EngineConfig,
) -> Result<String> {
    let text = compile(statement);
    if config.audit_generated_text {
        audit_literals(&text)?;
    }
    debug!(builder, text = %text, "generated statement");
    Ok(text)
}

/// Bind every parameter and apply pagination to a freshly created handle.
pub(crate) fn bind_query<Q>(
    mut query: Q,
    bindings: Vec<(String, BoundValue)>,
    pagination: Option<&Pagination>,
) -> Q
where
    Q: QueryHandle,
{
    for (name, value) in bindings {
        query.bind(&name, value);
    }
    apply_pagination(pagination, &mut query);
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{AUTHOR, BOOK};
    use crate::request::SortOrder;

    #[test]
    fn test_state_configured() {
        let mut state = BuilderState::default();
        assert!(!state.is_configured());

        state.sorting = Some(Sorting::new());
        assert!(!state.is_configured());

        state.sorting = Some(Sorting::new().by("title", SortOrder::Asc));
        assert!(state.is_configured());

        let paged = BuilderState {
            pagination: Some(Pagination::new(0, 10).unwrap()),
            ..Default::default()
        };
        assert!(paged.is_configured());
    }

    #[test]
    fn test_relationship_element() {
        let relationship = Relationship::new(
            AUTHOR,
            BOOK,
            "books",
            Instance::new(AUTHOR).with("id", 1i64),
            vec![],
        );
        let element = relationship.element();
        assert_eq!(element.owner().as_str(), AUTHOR);
        assert_eq!(element.target().as_str(), BOOK);
        assert_eq!(element.alias(), "example_Author_books");
    }

    #[test]
    fn test_collection_fetch_into_query() {
        let loaded: CollectionFetch<u8> = CollectionFetch::UseLoaded;
        assert!(!loaded.is_query());
        assert_eq!(loaded.into_query(), None);
        assert_eq!(CollectionFetch::Query(7u8).into_query(), Some(7));
    }
}
