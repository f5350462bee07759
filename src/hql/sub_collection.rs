//! Sub-collection fetch over an already-loaded relationship.
//!
//! The query is evaluated against the loaded collection itself, so fields are
//! referenced by their bare dotted paths and sort fields are not qualified.
//! Whether a query is issued at all is decided by [`CollectionFetchPolicy`].

use tracing::debug;

use crate::ast::{CollectionFilter, HqlStatement};
use crate::config::{CollectionFetchPolicy, EngineConfig};
use crate::db::{EntityDictionary, Session};
use crate::error::{HqlError, Result};
use crate::filter::FilterExpression;
use crate::request::{Pagination, Sorting};

use super::builder::{
    bind_query, statement_text, BuilderState, CollectionFetch, QueryBuilder, Relationship,
};
use super::clauses::order_terms;
use super::context::BuildContext;
use super::joins::Aliasing;
use super::render::render_expression;

pub struct SubCollectionFetchBuilder<'a, D: ?Sized, S> {
    relationship: &'a Relationship,
    dictionary: &'a D,
    session: &'a S,
    config: EngineConfig,
    state: BuilderState,
}

impl<'a, D, S> SubCollectionFetchBuilder<'a, D, S>
where
    D: EntityDictionary + ?Sized,
    S: Session,
{
    pub fn new(relationship: &'a Relationship, dictionary: &'a D, session: &'a S) -> Self {
        Self {
            relationship,
            dictionary,
            session,
            config: EngineConfig::default(),
            state: BuilderState::default(),
        }
    }

    fn needs_query(&self) -> bool {
        match self.config.collection_fetch {
            CollectionFetchPolicy::WhenConfigured => self.state.is_configured(),
            CollectionFetchPolicy::Always => true,
            CollectionFetchPolicy::Never => false,
        }
    }

    /// The collection filter `build()` would issue, with its bindings.
    pub fn statement(&self) -> Result<(HqlStatement, BuildContext)> {
        let relationship = self.relationship;
        if !self
            .dictionary
            .is_relation(&relationship.parent_type, &relationship.name)?
        {
            return Err(HqlError::InvalidPath(format!(
                "{}.{} is not a relationship",
                relationship.parent_type, relationship.name
            )));
        }

        let mut ctx = BuildContext::new();
        let mut statement = CollectionFilter::default();
        if let Some(ref filter) = self.state.filter {
            statement.filter = Some(render_expression(
                filter,
                self.dictionary,
                &mut ctx,
                Aliasing::Unaliased,
            )?);
        }
        statement.order_by = order_terms(
            self.state.sorting.as_ref(),
            &relationship.child_type,
            self.dictionary,
            None,
        )?;

        Ok((HqlStatement::CollectionFilter(statement), ctx))
    }
}

impl<'a, D, S> QueryBuilder for SubCollectionFetchBuilder<'a, D, S>
where
    D: EntityDictionary + ?Sized,
    S: Session,
{
    type Output = CollectionFetch<S::Query>;

    fn name(&self) -> &'static str {
        "sub-collection fetch"
    }

    fn with_filter(mut self, filter: Option<FilterExpression>) -> Self {
        self.state.filter = filter;
        self
    }

    fn with_sort(mut self, sorting: Option<Sorting>) -> Result<Self> {
        self.state.sorting = sorting;
        Ok(self)
    }

    fn with_pagination(mut self, pagination: Option<Pagination>) -> Result<Self> {
        self.state.pagination = pagination;
        Ok(self)
    }

    fn with_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    fn build(&self) -> Result<CollectionFetch<S::Query>> {
        if !self.needs_query() {
            debug!(
                relationship = %self.relationship.name,
                policy = ?self.config.collection_fetch,
                "using loaded collection"
            );
            return Ok(CollectionFetch::UseLoaded);
        }

        let (statement, ctx) = self.statement()?;
        let text = statement_text(self.name(), &statement, &self.config)?;
        let (_, bindings) = ctx.into_parts();

        let query = self
            .session
            .create_filter(&self.relationship.children, &text);
        Ok(CollectionFetch::Query(bind_query(
            query,
            bindings,
            self.state.pagination.as_ref(),
        )))
    }
}
