//! Root collection fetch:
//! `SELECT <alias> FROM <type> AS <alias> <joins> <where> <order by>`.

use tracing::debug;

use crate::ast::{HqlStatement, SelectStatement};
use crate::config::EngineConfig;
use crate::db::{EntityDictionary, Session};
use crate::error::{HqlError, Result};
use crate::filter::{FilterExpression, TypeName};
use crate::request::{Pagination, Sorting};

use super::builder::{bind_query, statement_text, BuilderState, QueryBuilder};
use super::clauses::order_terms;
use super::context::BuildContext;
use super::joins::Aliasing;
use super::render::render_expression;

pub struct RootCollectionFetchBuilder<'a, D: ?Sized, S> {
    entity: TypeName,
    dictionary: &'a D,
    session: &'a S,
    config: EngineConfig,
    state: BuilderState,
}

impl<'a, D, S> RootCollectionFetchBuilder<'a, D, S>
where
    D: EntityDictionary + ?Sized,
    S: Session,
{
    pub fn new(entity: impl Into<TypeName>, dictionary: &'a D, session: &'a S) -> Self {
        Self {
            entity: entity.into(),
            dictionary,
            session,
            config: EngineConfig::default(),
            state: BuilderState::default(),
        }
    }

    /// The statement `build()` would hand to the session, with its bindings.
    pub fn statement(&self) -> Result<(HqlStatement, BuildContext)> {
        // Fails with UnknownType before anything is rendered.
        self.dictionary.id_field_name(&self.entity)?;

        let mut ctx = BuildContext::new();
        let mut select = SelectStatement::entity(&self.entity);
        ctx.reserve(&select.alias);

        if let Some(ref filter) = self.state.filter {
            for predicate in filter.flatten() {
                if predicate.path().root() != &self.entity {
                    return Err(HqlError::InvalidPath(format!(
                        "`{}` starts at {} but the query is over {}",
                        predicate.path().field_path(),
                        predicate.path().root(),
                        self.entity
                    )));
                }
            }
            select.filter = Some(render_expression(
                filter,
                self.dictionary,
                &mut ctx,
                Aliasing::Joined,
            )?);
        }

        select.order_by = order_terms(
            self.state.sorting.as_ref(),
            &self.entity,
            self.dictionary,
            Some(&select.alias),
        )?;
        select.joins = ctx.joins().to_vec();

        Ok((HqlStatement::Select(select), ctx))
    }
}

impl<'a, D, S> QueryBuilder for RootCollectionFetchBuilder<'a, D, S>
where
    D: EntityDictionary + ?Sized,
    S: Session,
{
    type Output = S::Query;

    fn name(&self) -> &'static str {
        "root collection fetch"
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

    fn build(&self) -> Result<S::Query> {
        let (statement, ctx) = self.statement()?;
        let text = statement_text(self.name(), &statement, &self.config)?;
        let (joins, bindings) = ctx.into_parts();
        debug!(
            entity = %self.entity,
            joins = joins.len(),
            parameters = bindings.len(),
            "root fetch built"
        );

        let query = self.session.create_query(&text);
        Ok(bind_query(query, bindings, self.state.pagination.as_ref()))
    }
}
