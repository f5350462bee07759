//! HQL statement → query text.
//!
//! Spacing is part of the output contract: every clause ends with a single
//! trailing space, and the ORDER BY clause is introduced with a leading one.
//! A bare root fetch therefore compiles to
//! `SELECT example_Book FROM example.Book AS example_Book ` and appending a
//! sort gives `...AS example_Book  order by example_Book.title asc`.

use super::types::*;

/// Compile a statement into the text handed to the session.
pub fn compile(statement: &HqlStatement) -> String {
    match statement {
        HqlStatement::Select(s) => compile_select(s),
        HqlStatement::CollectionFilter(f) => compile_collection_filter(f),
    }
}

fn compile_select(select: &SelectStatement) -> String {
    let mut out = format!(
        "SELECT {} FROM {} AS {} ",
        compile_projection(&select.projection),
        select.entity,
        select.alias
    );

    for join in &select.joins {
        out.push_str(&compile_join(join));
        out.push(' ');
    }

    if let Some(ref filter) = select.filter {
        out.push_str(&compile_where(filter));
    }

    out.push_str(&compile_order_by(&select.order_by));
    out
}

fn compile_collection_filter(filter: &CollectionFilter) -> String {
    let mut out = String::new();
    if let Some(ref condition) = filter.filter {
        out.push_str(&compile_where(condition));
    }
    out.push_str(&compile_order_by(&filter.order_by));
    out
}

fn compile_projection(projection: &Projection) -> String {
    match projection {
        Projection::Entity(alias) => alias.clone(),
        Projection::CountDistinct(alias) => format!("COUNT(DISTINCT {})", alias),
    }
}

pub(crate) fn compile_join(join: &JoinFragment) -> String {
    format!("JOIN {}.{} {}", join.source, join.field, join.alias)
}

fn compile_where(condition: &Condition) -> String {
    format!("WHERE {} ", compile_condition(condition))
}

pub(crate) fn compile_condition(condition: &Condition) -> String {
    match condition {
        Condition::Comparison(fragment) => fragment.clone(),
        Condition::And(left, right) => format!(
            "({} AND {})",
            compile_condition(left),
            compile_condition(right)
        ),
        Condition::Or(left, right) => format!(
            "({} OR {})",
            compile_condition(left),
            compile_condition(right)
        ),
        Condition::Not(inner) => format!("NOT ({})", compile_condition(inner)),
    }
}

pub(crate) fn compile_order_term(term: &OrderTerm) -> String {
    format!("{} {}", term.field, term.order)
}

fn compile_order_by(terms: &[OrderTerm]) -> String {
    if terms.is_empty() {
        return String::new();
    }
    let items: Vec<String> = terms.iter().map(compile_order_term).collect();
    format!(" order by {}", items.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TypeName;
    use crate::request::SortOrder;

    fn book() -> SelectStatement {
        SelectStatement::entity(&TypeName::from("example.Book"))
    }

    #[test]
    fn test_compile_bare_select() {
        let text = compile(&HqlStatement::Select(book()));
        assert_eq!(text, "SELECT example_Book FROM example.Book AS example_Book ");
    }

    #[test]
    fn test_compile_select_with_order() {
        let mut select = book();
        select.order_by.push(OrderTerm {
            field: "example_Book.title".into(),
            order: SortOrder::Asc,
        });
        assert_eq!(
            compile(&HqlStatement::Select(select)),
            "SELECT example_Book FROM example.Book AS example_Book  order by example_Book.title asc"
        );
    }

    #[test]
    fn test_compile_joins_and_where() {
        let mut select = SelectStatement::entity(&TypeName::from("example.Author"));
        select.joins.push(JoinFragment {
            source: "example_Author".into(),
            field: "books".into(),
            alias: "example_Author_books".into(),
        });
        select.filter = Some(Condition::Comparison(
            "example_Author_books.title IN (:books_title_0)".into(),
        ));
        assert_eq!(
            compile(&HqlStatement::Select(select)),
            "SELECT example_Author FROM example.Author AS example_Author \
             JOIN example_Author.books example_Author_books \
             WHERE example_Author_books.title IN (:books_title_0) "
        );
    }

    #[test]
    fn test_compile_count_projection() {
        let mut select = SelectStatement::entity(&TypeName::from("example.Author"));
        select.projection = Projection::CountDistinct("example_Author_books".into());
        assert!(compile(&HqlStatement::Select(select))
            .starts_with("SELECT COUNT(DISTINCT example_Author_books) FROM example.Author"));
    }

    #[test]
    fn test_compile_nested_condition() {
        let condition = Condition::Or(
            Box::new(Condition::Comparison("a".into())),
            Box::new(Condition::And(
                Box::new(Condition::Comparison("b".into())),
                Box::new(Condition::Not(Box::new(Condition::Comparison("c".into())))),
            )),
        );
        assert_eq!(compile_condition(&condition), "(a OR (b AND NOT (c)))");
    }

    #[test]
    fn test_compile_collection_filter() {
        let sort_only = CollectionFilter {
            filter: None,
            order_by: vec![OrderTerm {
                field: "title".into(),
                order: SortOrder::Asc,
            }],
        };
        assert_eq!(
            compile(&HqlStatement::CollectionFilter(sort_only.clone())),
            " order by title asc"
        );

        let both = CollectionFilter {
            filter: Some(Condition::Comparison("publisher.name IN (:p_0)".into())),
            ..sort_only
        };
        assert_eq!(
            compile(&HqlStatement::CollectionFilter(both)),
            "WHERE publisher.name IN (:p_0)  order by title asc"
        );
    }

    #[test]
    fn test_compile_multiple_order_terms() {
        let mut select = book();
        select.order_by = vec![
            OrderTerm {
                field: "example_Book.title".into(),
                order: SortOrder::Asc,
            },
            OrderTerm {
                field: "example_Book.genre".into(),
                order: SortOrder::Desc,
            },
        ];
        assert!(compile(&HqlStatement::Select(select))
            .ends_with(" order by example_Book.title asc,example_Book.genre desc"));
    }
}
