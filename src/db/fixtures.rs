//! Shared test model: authors, books, chapters and publishers.

use super::dictionary::{EntityBinding, InMemoryDictionary};
use crate::filter::{Path, PathElement, ValueType};

pub const AUTHOR: &str = "example.Author";
pub const BOOK: &str = "example.Book";
pub const CHAPTER: &str = "example.Chapter";
pub const PUBLISHER: &str = "example.Publisher";

pub fn dictionary() -> InMemoryDictionary {
    InMemoryDictionary::new()
        .with_entity(
            EntityBinding::new(AUTHOR, "id", ValueType::Long)
                .attribute("name", ValueType::String)
                .to_many("books", BOOK),
        )
        .with_entity(
            EntityBinding::new(BOOK, "id", ValueType::Long)
                .attribute("title", ValueType::String)
                .attribute("genre", ValueType::String)
                .attribute("language", ValueType::String)
                .attribute("publishDate", ValueType::Long)
                .to_many("authors", AUTHOR)
                .to_many("chapters", CHAPTER)
                .to_one("publisher", PUBLISHER),
        )
        .with_entity(
            EntityBinding::new(CHAPTER, "id", ValueType::Long).attribute("title", ValueType::String),
        )
        .with_entity(
            EntityBinding::new(PUBLISHER, "id", ValueType::Long)
                .attribute("name", ValueType::String)
                .to_many("books", BOOK),
        )
}

/// Path from `(owner, target, field)` triples.
pub fn path(hops: &[(&str, &str, &str)]) -> Path {
    let elements = hops
        .iter()
        .map(|(owner, target, field)| PathElement::new(*owner, *target, field))
        .collect();
    Path::new(elements).expect("fixture path must be well formed")
}

/// Replace the numeric suffix of every `:name_N` parameter with `XXX`.
pub fn mask_parameters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..=pos]);
        rest = &rest[pos + 1..];
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = &rest[..end];
        match name.rfind('_') {
            Some(cut) if cut + 1 < name.len() && name[cut + 1..].chars().all(|c| c.is_ascii_digit()) => {
                out.push_str(&name[..=cut]);
                out.push_str("XXX");
            }
            _ => out.push_str(name),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

#[test]
fn test_mask_parameters() {
    assert_eq!(
        mask_parameters("a IN (:books_title_12) OR b < :id_3"),
        "a IN (:books_title_XXX) OR b < :id_XXX"
    );
    assert_eq!(mask_parameters("no params"), "no params");
}
