//! Field dereference paths.
//!
//! A [`Path`] is the chain of hops from a root entity down to a leaf
//! attribute (or a terminal relation). Each [`PathElement`] names the type the
//! field is declared on, the type the field points at, and the field itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::EntityDictionary;
use crate::error::{HqlError, Result};

/// Fully qualified type name, e.g. `example.Book`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Query alias for the type: namespace separators become underscores.
    pub fn alias(&self) -> String {
        self.0.replace("::", "_").replace('.', "_")
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One hop of a field dereference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElement {
    owner: TypeName,
    target: TypeName,
    field: String,
}

impl PathElement {
    pub fn new(owner: impl Into<TypeName>, target: impl Into<TypeName>, field: &str) -> Self {
        Self {
            owner: owner.into(),
            target: target.into(),
            field: field.to_string(),
        }
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn target(&self) -> &TypeName {
        &self.target
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// `<owner alias>_<field>`, the alias a join through this hop receives.
    pub fn alias(&self) -> String {
        format!("{}_{}", self.owner.alias(), self.field)
    }
}

/// Ordered root-to-leaf sequence of path elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    elements: Vec<PathElement>,
}

/// Deserialized form of [`Path`], checked by `Path::new` before use.
#[derive(Deserialize)]
struct RawPath {
    elements: Vec<PathElement>,
}

impl TryFrom<RawPath> for Path {
    type Error = HqlError;

    fn try_from(raw: RawPath) -> Result<Self> {
        Self::new(raw.elements)
    }
}

impl Path {
    /// Build a path, checking that every hop starts where the previous one ended.
    pub fn new(elements: Vec<PathElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(HqlError::InvalidPath("a path needs at least one element".into()));
        }
        for pair in elements.windows(2) {
            if pair[0].target != pair[1].owner {
                return Err(HqlError::InvalidPath(format!(
                    "`{}` resolves to {} but the next hop `{}` is declared on {}",
                    pair[0].field, pair[0].target, pair[1].field, pair[1].owner
                )));
            }
        }
        Ok(Self { elements })
    }

    pub fn single(element: PathElement) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Resolve a dotted field path such as `books.publisher.name` starting at `root`.
    pub fn parse<D>(root: &TypeName, dotted: &str, dictionary: &D) -> Result<Self>
    where
        D: EntityDictionary + ?Sized,
    {
        let mut owner = root.clone();
        let mut elements = Vec::new();
        for field in dotted.split('.') {
            let field = field.trim();
            if field.is_empty() {
                return Err(HqlError::InvalidPath(format!("empty segment in `{}`", dotted)));
            }
            let target = dictionary.field_type(&owner, field)?;
            elements.push(PathElement::new(owner, target.clone(), field));
            owner = target;
        }
        Self::new(elements)
    }

    /// A copy of this path with `element` inserted in front.
    pub fn prefixed(&self, element: PathElement) -> Result<Self> {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.push(element);
        elements.extend(self.elements.iter().cloned());
        Self::new(elements)
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn root(&self) -> &TypeName {
        self.elements[0].owner()
    }

    pub fn last(&self) -> &PathElement {
        &self.elements[self.elements.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Field names joined by `.`: `books.publisher.name`.
    pub fn field_path(&self) -> String {
        self.fields().join(".")
    }

    /// Field names joined by `_`, used as the stem of parameter names.
    pub fn parameter_stem(&self) -> String {
        self.fields().join("_")
    }

    fn fields(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.field()).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root(), self.field_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    #[test]
    fn test_type_alias() {
        assert_eq!(TypeName::from("example.Book").alias(), "example_Book");
        assert_eq!(TypeName::from("example::nested::Book").alias(), "example_nested_Book");
        assert_eq!(TypeName::from("Book").alias(), "Book");
    }

    #[test]
    fn test_element_alias() {
        let element = PathElement::new("example.Book", "example.Chapter", "chapters");
        assert_eq!(element.alias(), "example_Book_chapters");
    }

    #[test]
    fn test_deserialize_checks_elements() {
        assert!(serde_json::from_str::<Path>(r#"{"elements": []}"#).is_err());

        let path: Path = serde_json::from_str(
            r#"{"elements": [{"owner": "example.Book", "target": "string", "field": "title"}]}"#,
        )
        .unwrap();
        assert_eq!(path.field_path(), "title");
    }

    #[test]
    fn test_broken_chain_rejected() {
        let result = Path::new(vec![
            PathElement::new("example.Author", "example.Book", "books"),
            PathElement::new("example.Publisher", "string", "name"),
        ]);
        assert!(matches!(result, Err(HqlError::InvalidPath(_))));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(Path::new(vec![]).is_err());
    }

    #[test]
    fn test_field_path_and_stem() {
        let path = fixtures::path(&[
            ("example.Author", "example.Book", "books"),
            ("example.Book", "example.Publisher", "publisher"),
            ("example.Publisher", "string", "name"),
        ]);
        assert_eq!(path.field_path(), "books.publisher.name");
        assert_eq!(path.parameter_stem(), "books_publisher_name");
        assert_eq!(path.root().as_str(), "example.Author");
    }

    #[test]
    fn test_parse_dotted_path() {
        let dictionary = fixtures::dictionary();
        let path = Path::parse(&"example.Author".into(), "books.chapters.title", &dictionary)
            .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.elements()[1].owner().as_str(), "example.Book");
        assert_eq!(path.elements()[1].target().as_str(), "example.Chapter");
        assert_eq!(path.last().field(), "title");
    }

    #[test]
    fn test_parse_unknown_field() {
        let dictionary = fixtures::dictionary();
        let err = Path::parse(&"example.Book".into(), "publisher.nope", &dictionary).unwrap_err();
        assert_eq!(
            err,
            HqlError::UnknownField {
                entity: "example.Publisher".into(),
                field: "nope".into()
            }
        );
    }

    #[test]
    fn test_prefixed_keeps_original() {
        let path = fixtures::path(&[
            ("example.Book", "example.Publisher", "publisher"),
            ("example.Publisher", "string", "name"),
        ]);
        let prefixed = path
            .prefixed(PathElement::new("example.Author", "example.Book", "books"))
            .unwrap();
        assert_eq!(prefixed.field_path(), "books.publisher.name");
        assert_eq!(path.field_path(), "publisher.name");
    }
}
