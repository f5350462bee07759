//! Page totals for a sub-collection: how many members a relationship has
//! once the filter is applied.
//!
//! For `author#3.books` the count is taken from the owner side:
//!
//! ```text
//! SELECT COUNT(DISTINCT example_Author_books) FROM example.Author AS example_Author
//! JOIN example_Author.books example_Author_books
//! WHERE (<filter through books> AND example_Author.id IN (:id_N))
//! ```
//!
//! Counting from the owner works even when the child type has no pointer
//! back to it. Caller filters are written relative to the child type and are
//! re-rooted through the relationship field on a copy of the expression.

use tracing::debug;

use crate::ast::{HqlStatement, Projection, SelectStatement};
use crate::config::EngineConfig;
use crate::db::{EntityDictionary, Session};
use crate::error::{HqlError, Result};
use crate::filter::{coerce, FilterExpression, FilterPredicate, Operator, PathElement, TypeName};
use crate::request::{Pagination, Sorting};

use super::builder::{bind_query, statement_text, BuilderState, QueryBuilder, Relationship};
use super::context::BuildContext;
use super::joins::Aliasing;
use super::render::render_expression;

const NAME: &str = "sub-collection page totals";

pub struct SubCollectionPageTotalsBuilder<'a, D: ?Sized, S> {
    relationship: &'a Relationship,
    dictionary: &'a D,
    session: &'a S,
    config: EngineConfig,
    state: BuilderState,
}

impl<'a, D, S> SubCollectionPageTotalsBuilder<'a, D, S>
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

    /// `<parent id field> IN (<coerced parent id>)`.
    fn owner_predicate(&self) -> Result<FilterPredicate> {
        let parent_type = &self.relationship.parent_type;
        let id_field = self.dictionary.id_field_name(parent_type)?;
        let id_type = self.dictionary.id_type(parent_type)?;
        let id = coerce(&self.dictionary.id(&self.relationship.parent)?, id_type)?;

        let element = PathElement::new(
            parent_type.clone(),
            TypeName::new(id_type.label()),
            &id_field,
        );
        Ok(FilterPredicate::on_element(element, Operator::In, vec![id]))
    }

    pub fn statement(&self) -> Result<(HqlStatement, BuildContext)> {
        let relationship = self.relationship;
        let element = relationship.element();
        if !self
            .dictionary
            .is_relation(element.owner(), element.field())?
        {
            return Err(HqlError::InvalidPath(format!(
                "{}.{} is not a relationship",
                relationship.parent_type, relationship.name
            )));
        }

        let mut select = SelectStatement::entity(&relationship.parent_type);
        let mut ctx = BuildContext::new();
        ctx.reserve(&select.alias);

        // Joined up front so the count has its hop even without a filter.
        let relationship_alias = ctx.join(&select.alias, &element);
        select.projection = Projection::CountDistinct(relationship_alias);

        let owner = self.owner_predicate()?;
        let filter = match self.state.filter {
            Some(ref filter) => {
                let rerooted = filter.map_predicates(&mut |p: &FilterPredicate| {
                    p.prefixed(element.clone())
                })?;
                FilterExpression::and(rerooted, owner)
            }
            None => FilterExpression::from(owner),
        };

        select.filter = Some(render_expression(
            &filter,
            self.dictionary,
            &mut ctx,
            Aliasing::Joined,
        )?);
        select.joins = ctx.joins().to_vec();

        Ok((HqlStatement::Select(select), ctx))
    }
}

impl<'a, D, S> QueryBuilder for SubCollectionPageTotalsBuilder<'a, D, S>
where
    D: EntityDictionary + ?Sized,
    S: Session,
{
    type Output = S::Query;

    fn name(&self) -> &'static str {
        NAME
    }

    fn with_filter(mut self, filter: Option<FilterExpression>) -> Self {
        self.state.filter = filter;
        self
    }

    /// A count has no order.
    fn with_sort(self, _sorting: Option<Sorting>) -> Result<Self> {
        Err(HqlError::UnsupportedOperation {
            builder: NAME,
            operation: "sorting",
        })
    }

    /// A count has no page.
    fn with_pagination(self, _pagination: Option<Pagination>) -> Result<Self> {
        Err(HqlError::UnsupportedOperation {
            builder: NAME,
            operation: "pagination",
        })
    }

    fn with_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    fn build(&self) -> Result<S::Query> {
        let (statement, ctx) = self.statement()?;
        let text = statement_text(self.name(), &statement, &self.config)?;
        let (_, bindings) = ctx.into_parts();
        debug!(
            parent = %self.relationship.parent_type,
            relationship = %self.relationship.name,
            "page totals built"
        );

        let query = self.session.create_query(&text);
        Ok(bind_query(query, bindings, None))
    }
}
