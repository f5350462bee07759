use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::dictionary::{EntityBinding, FieldKind, InMemoryDictionary};
use crate::filter::{TypeName, ValueType};

/// On-disk entity schema.
///
/// ```toml
/// [[entity]]
/// name = "example.Book"
/// id = "id"
///
/// [entity.attributes]
/// id = "long"
/// title = "string"
///
/// [entity.to_one]
/// publisher = "example.Publisher"
///
/// [entity.to_many]
/// chapters = "example.Chapter"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    #[serde(default = "default_id_field")]
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, ValueType>,
    #[serde(default)]
    pub to_one: BTreeMap<String, String>,
    #[serde(default)]
    pub to_many: BTreeMap<String, String>,
}

fn default_id_field() -> String {
    String::from("id")
}

impl SchemaFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse schema file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check cross-references and build the dictionary.
    pub fn into_dictionary(self) -> Result<InMemoryDictionary> {
        let names: Vec<&str> = self.entities.iter().map(|e| e.name.as_str()).collect();
        let mut dictionary = InMemoryDictionary::new();

        for entity in &self.entities {
            let id_type = match entity.attributes.get(&entity.id) {
                Some(t) => *t,
                None => anyhow::bail!(
                    "entity {} declares identifier `{}` but no attribute of that name",
                    entity.name,
                    entity.id
                ),
            };

            let mut binding = EntityBinding::new(entity.name.as_str(), &entity.id, id_type);
            for (field, value_type) in &entity.attributes {
                binding = binding.attribute(field, *value_type);
            }
            for (field, target) in entity.to_one.iter().chain(entity.to_many.iter()) {
                if !names.contains(&target.as_str()) {
                    anyhow::bail!(
                        "relation {}.{} points at unknown entity {}",
                        entity.name,
                        field,
                        target
                    );
                }
                if entity.attributes.contains_key(field) {
                    anyhow::bail!("field {}.{} is declared twice", entity.name, field);
                }
            }
            for (field, target) in &entity.to_one {
                binding = binding.to_one(field, TypeName::new(target.as_str()));
            }
            for (field, target) in &entity.to_many {
                if entity.to_one.contains_key(field) {
                    anyhow::bail!("field {}.{} is declared twice", entity.name, field);
                }
                binding = binding.to_many(field, TypeName::new(target.as_str()));
            }
            dictionary.bind_entity(binding);
        }

        Ok(dictionary)
    }
}

/// Summary line per field, used by the CLI's schema listing.
pub fn describe_field(field: &str, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Attribute(t) => format!("{}: {}", field, t),
        FieldKind::ToOne(t) => format!("{} -> {}", field, t),
        FieldKind::ToMany(t) => format!("{} ->> {}", field, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EntityDictionary;

    const SCHEMA: &str = r#"
[[entity]]
name = "example.Author"

[entity.attributes]
id = "long"
name = "string"

[entity.to_many]
books = "example.Book"

[[entity]]
name = "example.Book"

[entity.attributes]
id = "long"
title = "string"

[entity.to_many]
authors = "example.Author"
"#;

    #[test]
    fn test_schema_to_dictionary() {
        let dictionary = SchemaFile::from_toml(SCHEMA)
            .unwrap()
            .into_dictionary()
            .unwrap();
        let author = TypeName::from("example.Author");
        assert!(dictionary.is_relation(&author, "books").unwrap());
        assert!(!dictionary.is_relation(&author, "name").unwrap());
        assert_eq!(dictionary.id_type(&author).unwrap(), ValueType::Long);
        assert_eq!(
            dictionary.field_type(&author, "books").unwrap(),
            TypeName::from("example.Book")
        );
    }

    #[test]
    fn test_dangling_relation_rejected() {
        let schema = r#"
[[entity]]
name = "example.Book"
[entity.attributes]
id = "long"
[entity.to_one]
publisher = "example.Publisher"
"#;
        let result = SchemaFile::from_toml(schema).unwrap().into_dictionary();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_id_attribute_rejected() {
        let schema = r#"
[[entity]]
name = "example.Book"
id = "isbn"
[entity.attributes]
title = "string"
"#;
        let result = SchemaFile::from_toml(schema).unwrap().into_dictionary();
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_field() {
        assert_eq!(
            describe_field("books", &FieldKind::ToMany("example.Book".into())),
            "books ->> example.Book"
        );
        assert_eq!(
            describe_field("title", &FieldKind::Attribute(ValueType::String)),
            "title: string"
        );
    }
}
