//! Sort and pagination clauses.

use crate::ast::OrderTerm;
use crate::db::{EntityDictionary, QueryHandle};
use crate::error::Result;
use crate::filter::TypeName;
use crate::request::{Pagination, Sorting};

/// ORDER BY terms for the dictionary-validated rules of `sorting`.
///
/// Absent or default sorting yields no terms. With `alias`, each field is
/// qualified as `alias.field`.
pub fn order_terms<D>(
    sorting: Option<&Sorting>,
    entity: &TypeName,
    dictionary: &D,
    alias: Option<&str>,
) -> Result<Vec<OrderTerm>>
where
    D: EntityDictionary + ?Sized,
{
    let sorting = match sorting {
        Some(s) if !s.is_default() => s,
        _ => return Ok(Vec::new()),
    };

    let terms = sorting
        .valid_rules(entity, dictionary)?
        .into_iter()
        .map(|rule| OrderTerm {
            field: match alias {
                Some(alias) => format!("{}.{}", alias, rule.field_path),
                None => rule.field_path,
            },
            order: rule.order,
        })
        .collect();
    Ok(terms)
}

/// Push offset and limit onto the handle. Absent pagination leaves it unbounded.
pub fn apply_pagination<Q>(pagination: Option<&Pagination>, query: &mut Q)
where
    Q: QueryHandle + ?Sized,
{
    if let Some(page) = pagination {
        query.set_first_result(page.offset());
        query.set_max_results(page.limit());
    }
}
