//! Filter expression → WHERE condition.
//!
//! Joins are resolved for the flattened predicates first, then the tree is
//! walked in the same left-to-right order, consuming one reference per
//! predicate. Operand values only ever leave through named parameters
//! registered on the build context.

use std::vec::IntoIter;

use crate::ast::Condition;
use crate::db::EntityDictionary;
use crate::error::{HqlError, Result};
use crate::filter::{FilterExpression, FilterPredicate};

use super::context::BuildContext;
use super::joins::{resolve_all, Aliasing, AttributeRef};

pub fn render_expression<D>(
    expression: &FilterExpression,
    dictionary: &D,
    ctx: &mut BuildContext,
    aliasing: Aliasing,
) -> Result<Condition>
where
    D: EntityDictionary + ?Sized,
{
    let predicates = expression.flatten();
    let references = resolve_all(&predicates, dictionary, ctx, aliasing)?;
    let mut references = references.into_iter();
    render_node(expression, &mut references, ctx)
}

fn render_node(
    expression: &FilterExpression,
    references: &mut IntoIter<AttributeRef>,
    ctx: &mut BuildContext,
) -> Result<Condition> {
    Ok(match expression {
        FilterExpression::Predicate(p) => {
            let reference = references.next().ok_or_else(|| {
                HqlError::InvalidFilter(format!("no resolved reference for `{}`", p))
            })?;
            Condition::Comparison(render_predicate(p, &reference, ctx)?)
        }
        FilterExpression::And(left, right) => Condition::And(
            Box::new(render_node(left, references, ctx)?),
            Box::new(render_node(right, references, ctx)?),
        ),
        FilterExpression::Or(left, right) => Condition::Or(
            Box::new(render_node(left, references, ctx)?),
            Box::new(render_node(right, references, ctx)?),
        ),
        FilterExpression::Not(inner) => {
            Condition::Not(Box::new(render_node(inner, references, ctx)?))
        }
    })
}

/// Render one predicate against `reference`, binding its operand if any.
pub fn render_predicate(
    predicate: &FilterPredicate,
    reference: &AttributeRef,
    ctx: &mut BuildContext,
) -> Result<String> {
    let field = reference.to_string();
    let operator = predicate.operator();
    match predicate.bound_value()? {
        Some(value) => {
            let name = ctx.parameter_name(&predicate.path().parameter_stem());
            let fragment = operator.render(&field, &name);
            ctx.bind(name, value);
            Ok(fragment)
        }
        None => Ok(operator.render(&field, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::compiler::compile_condition;
    use crate::db::fixtures::{self, mask_parameters, AUTHOR, BOOK, CHAPTER, PUBLISHER};
    use crate::filter::{BoundValue, Operator, Value};

    fn title_in(value: &str) -> FilterPredicate {
        FilterPredicate::new(
            fixtures::path(&[(BOOK, "string", "title")]),
            Operator::In,
            vec![Value::from(value)],
        )
    }

    #[test]
    fn test_render_tree_shape() {
        let dictionary = fixtures::dictionary();
        let mut ctx = BuildContext::new();
        let genre_null = FilterPredicate::new(
            fixtures::path(&[(BOOK, "string", "genre")]),
            Operator::IsNull,
            vec![],
        );
        let expr = FilterExpression::or(
            title_in("A"),
            FilterExpression::and(title_in("B"), FilterExpression::negate(genre_null)),
        );
        let condition = render_expression(&expr, &dictionary, &mut ctx, Aliasing::Joined).unwrap();
        assert_eq!(
            mask_parameters(&compile_condition(&condition)),
            "(example_Book.title IN (:title_XXX) OR (example_Book.title IN (:title_XXX) \
             AND NOT (example_Book.genre IS NULL)))"
        );
    }

    #[test]
    fn test_same_path_twice_gets_distinct_parameters() {
        let dictionary = fixtures::dictionary();
        let mut ctx = BuildContext::new();
        let expr = FilterExpression::and(title_in("A"), title_in("B"));
        render_expression(&expr, &dictionary, &mut ctx, Aliasing::Joined).unwrap();

        let names: Vec<&str> = ctx.bindings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        assert_eq!(
            ctx.bindings()[1].1,
            BoundValue::List(vec![Value::from("B")])
        );
    }

    #[test]
    fn test_parameters_match_parameterized_predicates() {
        let dictionary = fixtures::dictionary();
        let mut ctx = BuildContext::new();
        let chapters = FilterPredicate::new(
            fixtures::path(&[
                (AUTHOR, BOOK, "books"),
                (BOOK, CHAPTER, "chapters"),
                (CHAPTER, "string", "title"),
            ]),
            Operator::Prefix,
            vec![Value::from("50%")],
        );
        let publisher = FilterPredicate::new(
            fixtures::path(&[
                (AUTHOR, BOOK, "books"),
                (BOOK, PUBLISHER, "publisher"),
                (PUBLISHER, "string", "name"),
            ]),
            Operator::NotNull,
            vec![],
        );
        let expr = FilterExpression::and(chapters, publisher);
        let condition = render_expression(&expr, &dictionary, &mut ctx, Aliasing::Joined).unwrap();

        assert_eq!(ctx.bindings().len(), 1);
        let (name, value) = &ctx.bindings()[0];
        assert!(name.starts_with("books_chapters_title_"));
        assert_eq!(value, &BoundValue::Single(Value::from("50\\%")));
        assert_eq!(
            mask_parameters(&compile_condition(&condition)),
            "(example_Book_chapters.title LIKE CONCAT(:books_chapters_title_XXX, '%') \
             AND example_Book_publisher.name IS NOT NULL)"
        );
        assert_eq!(ctx.joins().len(), 3);
    }

    #[test]
    fn test_missing_operand_fails() {
        let dictionary = fixtures::dictionary();
        let mut ctx = BuildContext::new();
        let empty = FilterPredicate::new(
            fixtures::path(&[(BOOK, "string", "title")]),
            Operator::In,
            vec![],
        );
        let expr = FilterExpression::from(empty);
        let result = render_expression(&expr, &dictionary, &mut ctx, Aliasing::Joined);
        assert!(matches!(result, Err(HqlError::MissingOperand { .. })));
    }
}
