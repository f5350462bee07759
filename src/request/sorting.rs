use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::EntityDictionary;
use crate::error::{HqlError, Result};
use crate::filter::TypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A sort rule that survived dictionary validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    pub field_path: String,
    pub order: SortOrder,
}

/// Requested sort: dotted field paths with a direction, in request order.
///
/// The empty value is the default instance and renders no ORDER BY.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sorting {
    rules: Vec<(String, SortOrder)>,
}

impl Sorting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Sorting the same field twice keeps the first position and
    /// the last direction.
    pub fn by(mut self, field: &str, order: SortOrder) -> Self {
        match self.rules.iter_mut().find(|(f, _)| f == field) {
            Some(existing) => existing.1 = order,
            None => self.rules.push((field.to_string(), order)),
        }
        self
    }

    /// Parse the request form `-title,genre,+publisher.name`.
    ///
    /// A leading `-` sorts descending, a leading `+` (or nothing) ascending.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sorting = Self::new();
        for raw in text.split(',') {
            let raw = raw.trim();
            let (field, order) = if let Some(rest) = raw.strip_prefix('-') {
                (rest, SortOrder::Desc)
            } else if let Some(rest) = raw.strip_prefix('+') {
                (rest, SortOrder::Asc)
            } else {
                (raw, SortOrder::Asc)
            };
            if field.is_empty() {
                return Err(HqlError::InvalidSort(format!("empty sort field in `{}`", text)));
            }
            sorting = sorting.by(field, order);
        }
        Ok(sorting)
    }

    pub fn is_default(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[(String, SortOrder)] {
        &self.rules
    }

    /// Rules the dictionary accepts for `entity`, in request order.
    pub fn valid_rules<D>(&self, entity: &TypeName, dictionary: &D) -> Result<Vec<SortRule>>
    where
        D: EntityDictionary + ?Sized,
    {
        dictionary.valid_sort_rules(entity, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directions() {
        let sorting = Sorting::parse("-title, genre,+publisher.name").unwrap();
        assert_eq!(
            sorting.rules(),
            &[
                ("title".to_string(), SortOrder::Desc),
                ("genre".to_string(), SortOrder::Asc),
                ("publisher.name".to_string(), SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_empty_field() {
        assert!(matches!(Sorting::parse("title,,genre"), Err(HqlError::InvalidSort(_))));
        assert!(Sorting::parse("-").is_err());
    }

    #[test]
    fn test_last_direction_wins() {
        let sorting = Sorting::new()
            .by("title", SortOrder::Asc)
            .by("genre", SortOrder::Asc)
            .by("title", SortOrder::Desc);
        assert_eq!(
            sorting.rules(),
            &[
                ("title".to_string(), SortOrder::Desc),
                ("genre".to_string(), SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_default_instance() {
        assert!(Sorting::default().is_default());
        assert!(!Sorting::new().by("title", SortOrder::Asc).is_default());
    }
}
