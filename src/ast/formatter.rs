//! HQL pretty-printer.
//!
//! Renders a statement one clause per line, with joins and nested boolean
//! groups indented. Used for display only; the session always receives the
//! compact text from the compiler.

use super::compiler::{compile_condition, compile_join, compile_order_term};
use super::types::*;

const INDENT: &str = "    ";

pub fn format_hql(statement: &HqlStatement) -> String {
    match statement {
        HqlStatement::Select(s) => format_select(s),
        HqlStatement::CollectionFilter(f) => format_collection_filter(f),
    }
}

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

fn format_select(select: &SelectStatement) -> String {
    let mut lines = Vec::new();

    let projection = match &select.projection {
        Projection::Entity(alias) => alias.clone(),
        Projection::CountDistinct(alias) => format!("COUNT(DISTINCT {})", alias),
    };
    lines.push(format!("SELECT {}", projection));
    lines.push(format!("FROM {} AS {}", select.entity, select.alias));

    for join in &select.joins {
        lines.push(format!("{}{}", indent(1), compile_join(join)));
    }

    if let Some(ref filter) = select.filter {
        lines.push(format!("WHERE {}", format_condition(filter, 0)));
    }

    if let Some(order) = format_order_by(&select.order_by) {
        lines.push(order);
    }

    lines.join("\n")
}

fn format_collection_filter(filter: &CollectionFilter) -> String {
    let mut lines = Vec::new();
    if let Some(ref condition) = filter.filter {
        lines.push(format!("WHERE {}", format_condition(condition, 0)));
    }
    if let Some(order) = format_order_by(&filter.order_by) {
        lines.push(order);
    }
    lines.join("\n")
}

fn format_order_by(terms: &[OrderTerm]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    let items: Vec<String> = terms.iter().map(compile_order_term).collect();
    Some(format!("ORDER BY {}", items.join(", ")))
}

/// Groups that fit comfortably stay on one line; larger ones break per operand.
fn format_condition(condition: &Condition, depth: usize) -> String {
    let flat = compile_condition(condition);
    if flat.len() <= 60 {
        return flat;
    }

    match condition {
        Condition::Comparison(fragment) => fragment.clone(),
        Condition::And(left, right) => format_group("AND", left, right, depth),
        Condition::Or(left, right) => format_group("OR", left, right, depth),
        Condition::Not(inner) => match inner.as_ref() {
            Condition::Comparison(_) | Condition::Not(_) => {
                format!("NOT ({})", format_condition(inner, depth))
            }
            _ => format!("NOT {}", format_condition(inner, depth)),
        },
    }
}

fn format_group(keyword: &str, left: &Condition, right: &Condition, depth: usize) -> String {
    format!(
        "(\n{}{}\n{}{} {}\n{})",
        indent(depth + 1),
        format_condition(left, depth + 1),
        indent(depth + 1),
        keyword,
        format_condition(right, depth + 1),
        indent(depth)
    )
}
