//! Join/alias resolution.
//!
//! For each predicate, walks its path from the root and joins every leading
//! relation hop. The first hop joins from the alias of its owner type; each
//! later hop joins from the alias the previous hop produced. The walk stops at
//! the first attribute, and everything from the last joined owner onward is
//! rendered as a plain attribute reference.
//!
//! ```text
//! Author.books.chapters.title
//!   JOIN example_Author.books example_Author_books
//!   JOIN example_Author_books.chapters example_Book_chapters
//!   → example_Book_chapters.title
//! ```

use std::fmt;

use crate::db::EntityDictionary;
use crate::error::Result;
use crate::filter::FilterPredicate;

use super::context::BuildContext;

/// How predicates refer to their fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aliasing {
    /// Joined and qualified by alias, for queries over a root entity.
    Joined,
    /// Bare dotted field paths, for filters over a loaded collection.
    Unaliased,
}

/// Where a predicate's field lives once joins are in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub alias: Option<String>,
    pub field_path: String,
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias {
            Some(ref alias) => write!(f, "{}.{}", alias, self.field_path),
            None => write!(f, "{}", self.field_path),
        }
    }
}

/// Resolve every predicate, in order, emitting joins into `ctx`.
pub fn resolve_all<D>(
    predicates: &[&FilterPredicate],
    dictionary: &D,
    ctx: &mut BuildContext,
    aliasing: Aliasing,
) -> Result<Vec<AttributeRef>>
where
    D: EntityDictionary + ?Sized,
{
    predicates
        .iter()
        .map(|predicate| match aliasing {
            Aliasing::Joined => resolve(predicate, dictionary, ctx),
            Aliasing::Unaliased => unaliased(predicate, dictionary),
        })
        .collect()
}

/// The bare dotted path of a predicate, with every hop checked against the
/// dictionary.
fn unaliased<D>(predicate: &FilterPredicate, dictionary: &D) -> Result<AttributeRef>
where
    D: EntityDictionary + ?Sized,
{
    for element in predicate.path().elements() {
        dictionary.field_kind(element.owner(), element.field())?;
    }
    Ok(AttributeRef {
        alias: None,
        field_path: predicate.path().field_path(),
    })
}

/// Join the relation prefix of one predicate's path and return the aliased
/// reference its fragment should compare against.
pub fn resolve<D>(
    predicate: &FilterPredicate,
    dictionary: &D,
    ctx: &mut BuildContext,
) -> Result<AttributeRef>
where
    D: EntityDictionary + ?Sized,
{
    let elements = predicate.path().elements();
    let last = elements.len() - 1;

    let mut reference = predicate.path().root().alias();
    let mut consumed = 0;
    let mut previous: Option<String> = None;

    for (i, element) in elements.iter().enumerate() {
        if !dictionary.is_relation(element.owner(), element.field())? {
            break;
        }
        let source = match previous {
            Some(ref alias) => alias.clone(),
            None => element.owner().alias(),
        };
        let alias = ctx.join(&source, element);

        // A terminal relation is still joined, but compared through its owner.
        if i < last {
            reference = alias.clone();
            consumed = i + 1;
        }
        previous = Some(alias);
    }

    let field_path: Vec<&str> = elements[consumed..].iter().map(|e| e.field()).collect();
    Ok(AttributeRef {
        alias: Some(reference),
        field_path: field_path.join("."),
    })
}
