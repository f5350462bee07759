//! Entity/relationship metadata consulted while translating filters.
//!
//! [`EntityDictionary`] is the read-only capability the builders depend on.
//! [`InMemoryDictionary`] is the bundled implementation, populated either in
//! code through [`EntityBinding`] or from a TOML schema (see `schema.rs`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HqlError, Result};
use crate::filter::{TypeName, Value, ValueType};
use crate::request::{SortRule, Sorting};

/// What a field on an entity holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Attribute(ValueType),
    ToOne(TypeName),
    ToMany(TypeName),
}

impl FieldKind {
    pub fn is_relation(&self) -> bool {
        !matches!(self, FieldKind::Attribute(_))
    }

    /// Type the field dereferences to. Attributes report their value type.
    pub fn target(&self) -> TypeName {
        match self {
            FieldKind::Attribute(t) => TypeName::new(t.label()),
            FieldKind::ToOne(t) | FieldKind::ToMany(t) => t.clone(),
        }
    }
}

/// A loaded entity instance: its type and field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    entity_type: TypeName,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub fn new(entity_type: impl Into<TypeName>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn entity_type(&self) -> &TypeName {
        &self.entity_type
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Read-only metadata about bound entity types.
pub trait EntityDictionary {
    /// Kind of `field` on `entity`; fails when either is unknown.
    fn field_kind(&self, entity: &TypeName, field: &str) -> Result<FieldKind>;

    /// Name of the identifier field of `entity`.
    fn id_field_name(&self, entity: &TypeName) -> Result<String>;

    fn is_relation(&self, entity: &TypeName, field: &str) -> Result<bool> {
        Ok(self.field_kind(entity, field)?.is_relation())
    }

    fn field_type(&self, entity: &TypeName, field: &str) -> Result<TypeName> {
        Ok(self.field_kind(entity, field)?.target())
    }

    fn id_type(&self, entity: &TypeName) -> Result<ValueType> {
        let field = self.id_field_name(entity)?;
        match self.field_kind(entity, &field)? {
            FieldKind::Attribute(t) => Ok(t),
            _ => Err(HqlError::InvalidPath(format!(
                "identifier `{}` of {} is a relation",
                field, entity
            ))),
        }
    }

    /// Stored identifier value of `instance`.
    fn id(&self, instance: &Instance) -> Result<Value> {
        let field = self.id_field_name(instance.entity_type())?;
        match instance.get(&field) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(HqlError::MissingIdentifier {
                entity: instance.entity_type().to_string(),
                field,
            }),
        }
    }

    /// The requested rules that can be sorted on for `entity`.
    ///
    /// A rule survives when every hop but the last is a to-one relation and
    /// the last hop is an attribute. Other rules are dropped.
    fn valid_sort_rules(&self, entity: &TypeName, sorting: &Sorting) -> Result<Vec<SortRule>> {
        // Unknown root types are an error, unlike unknown sort fields.
        self.id_field_name(entity)?;

        let mut valid = Vec::new();
        for (field_path, order) in sorting.rules() {
            if is_sortable(self, entity, field_path) {
                valid.push(SortRule {
                    field_path: field_path.clone(),
                    order: *order,
                });
            } else {
                debug!(entity = %entity, field = %field_path, "dropping invalid sort rule");
            }
        }
        Ok(valid)
    }
}

fn is_sortable<D>(dictionary: &D, entity: &TypeName, field_path: &str) -> bool
where
    D: EntityDictionary + ?Sized,
{
    let segments: Vec<&str> = field_path.split('.').collect();
    let mut owner = entity.clone();
    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();
        match dictionary.field_kind(&owner, segment) {
            Ok(FieldKind::Attribute(_)) if last => return true,
            Ok(FieldKind::ToOne(target)) if !last => owner = target,
            _ => return false,
        }
    }
    false
}

/// Field layout of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBinding {
    pub name: TypeName,
    pub id_field: String,
    pub fields: BTreeMap<String, FieldKind>,
}

impl EntityBinding {
    pub fn new(name: impl Into<TypeName>, id_field: &str, id_type: ValueType) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(id_field.to_string(), FieldKind::Attribute(id_type));
        Self {
            name: name.into(),
            id_field: id_field.to_string(),
            fields,
        }
    }

    pub fn attribute(mut self, field: &str, value_type: ValueType) -> Self {
        self.fields
            .insert(field.to_string(), FieldKind::Attribute(value_type));
        self
    }

    pub fn to_one(mut self, field: &str, target: impl Into<TypeName>) -> Self {
        self.fields
            .insert(field.to_string(), FieldKind::ToOne(target.into()));
        self
    }

    pub fn to_many(mut self, field: &str, target: impl Into<TypeName>) -> Self {
        self.fields
            .insert(field.to_string(), FieldKind::ToMany(target.into()));
        self
    }
}

/// Dictionary backed by a map of [`EntityBinding`]s.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDictionary {
    entities: HashMap<TypeName, EntityBinding>,
}

impl InMemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_entity(&mut self, binding: EntityBinding) {
        self.entities.insert(binding.name.clone(), binding);
    }

    pub fn with_entity(mut self, binding: EntityBinding) -> Self {
        self.bind_entity(binding);
        self
    }

    pub fn binding(&self, entity: &TypeName) -> Result<&EntityBinding> {
        self.entities
            .get(entity)
            .ok_or_else(|| HqlError::UnknownType(entity.to_string()))
    }

    pub fn entity_names(&self) -> Vec<&TypeName> {
        let mut names: Vec<&TypeName> = self.entities.keys().collect();
        names.sort();
        names
    }
}

impl EntityDictionary for InMemoryDictionary {
    fn field_kind(&self, entity: &TypeName, field: &str) -> Result<FieldKind> {
        self.binding(entity)?
            .fields
            .get(field)
            .cloned()
            .ok_or_else(|| HqlError::UnknownField {
                entity: entity.to_string(),
                field: field.to_string(),
            })
    }

    fn id_field_name(&self, entity: &TypeName) -> Result<String> {
        Ok(self.binding(entity)?.id_field.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::request::SortOrder;

    #[test]
    fn test_relation_lookup() {
        let dictionary = fixtures::dictionary();
        let book = TypeName::from("example.Book");
        assert!(dictionary.is_relation(&book, "chapters").unwrap());
        assert!(dictionary.is_relation(&book, "publisher").unwrap());
        assert!(!dictionary.is_relation(&book, "title").unwrap());
    }

    #[test]
    fn test_unknown_field_and_type() {
        let dictionary = fixtures::dictionary();
        assert_eq!(
            dictionary.is_relation(&"example.Book".into(), "isbn"),
            Err(HqlError::UnknownField {
                entity: "example.Book".into(),
                field: "isbn".into()
            })
        );
        assert_eq!(
            dictionary.is_relation(&"example.Shelf".into(), "books"),
            Err(HqlError::UnknownType("example.Shelf".into()))
        );
    }

    #[test]
    fn test_id_metadata() {
        let dictionary = fixtures::dictionary();
        let author = TypeName::from("example.Author");
        assert_eq!(dictionary.id_field_name(&author).unwrap(), "id");
        assert_eq!(dictionary.id_type(&author).unwrap(), ValueType::Long);
        let instance = Instance::new("example.Author").with("id", 3i64);
        assert_eq!(dictionary.id(&instance).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_missing_id_value() {
        let dictionary = fixtures::dictionary();
        let instance = Instance::new("example.Author").with("name", "Ann");
        assert!(matches!(
            dictionary.id(&instance),
            Err(HqlError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn test_valid_sort_rules_drop_unknown() {
        let dictionary = fixtures::dictionary();
        let sorting = Sorting::new()
            .by("nope", SortOrder::Asc)
            .by("title", SortOrder::Desc)
            .by("publisher.name", SortOrder::Asc)
            .by("chapters.title", SortOrder::Asc)
            .by("publisher", SortOrder::Asc);
        let rules = dictionary
            .valid_sort_rules(&"example.Book".into(), &sorting)
            .unwrap();
        assert_eq!(
            rules,
            vec![
                SortRule {
                    field_path: "title".into(),
                    order: SortOrder::Desc
                },
                SortRule {
                    field_path: "publisher.name".into(),
                    order: SortOrder::Asc
                },
            ]
        );
    }

    #[test]
    fn test_valid_sort_rules_unknown_entity() {
        let dictionary = fixtures::dictionary();
        let sorting = Sorting::new().by("title", SortOrder::Asc);
        assert!(dictionary
            .valid_sort_rules(&"example.Shelf".into(), &sorting)
            .is_err());
    }
}
