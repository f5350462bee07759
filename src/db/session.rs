//! Persistence session and query handle capabilities.
//!
//! The builders never execute anything. They ask a [`Session`] for a handle
//! over the generated text and push parameters and paging onto it.
//! [`RecordingSession`] keeps everything it is given, which is what the CLI
//! prints and what the tests assert on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dictionary::Instance;
use crate::filter::{BoundValue, Value};

/// Handle over one query: accepts named parameters and paging.
pub trait QueryHandle {
    fn set_parameter(&mut self, name: &str, value: Value);

    fn set_parameter_list(&mut self, name: &str, values: Vec<Value>);

    fn set_first_result(&mut self, offset: usize);

    fn set_max_results(&mut self, limit: usize);

    fn bind(&mut self, name: &str, value: BoundValue) {
        match value {
            BoundValue::Single(v) => self.set_parameter(name, v),
            BoundValue::List(vs) => self.set_parameter_list(name, vs),
        }
    }
}

pub trait Session {
    type Query: QueryHandle;

    fn create_query(&self, text: &str) -> Self::Query;

    /// Query evaluated against an already-loaded collection rather than a root
    /// entity. Sessions without collection filters treat it as a plain query.
    fn create_filter(&self, collection: &[Instance], text: &str) -> Self::Query {
        let _ = collection;
        self.create_query(text)
    }
}

/// Everything a [`RecordingSession`] query was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedQuery {
    pub text: String,
    pub parameters: BTreeMap<String, BoundValue>,
    pub first_result: Option<usize>,
    pub max_results: Option<usize>,
    /// Size of the collection the query filters, for collection filters.
    pub collection_size: Option<usize>,
}

impl RecordedQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameter(&self, name: &str) -> Option<&BoundValue> {
        self.parameters.get(name)
    }

    /// Bound parameter names, sorted.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(|k| k.as_str()).collect()
    }
}

impl QueryHandle for RecordedQuery {
    fn set_parameter(&mut self, name: &str, value: Value) {
        self.parameters
            .insert(name.to_string(), BoundValue::Single(value));
    }

    fn set_parameter_list(&mut self, name: &str, values: Vec<Value>) {
        self.parameters
            .insert(name.to_string(), BoundValue::List(values));
    }

    fn set_first_result(&mut self, offset: usize) {
        self.first_result = Some(offset);
    }

    fn set_max_results(&mut self, limit: usize) {
        self.max_results = Some(limit);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingSession;

impl RecordingSession {
    pub fn new() -> Self {
        Self
    }
}

impl Session for RecordingSession {
    type Query = RecordedQuery;

    fn create_query(&self, text: &str) -> RecordedQuery {
        RecordedQuery {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn create_filter(&self, collection: &[Instance], text: &str) -> RecordedQuery {
        RecordedQuery {
            text: text.to_string(),
            collection_size: Some(collection.len()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_bindings() {
        let session = RecordingSession::new();
        let mut query = session.create_query("SELECT x FROM X AS x ");
        query.bind("a_0", BoundValue::Single(Value::Int(1)));
        query.bind("b_1", BoundValue::List(vec![Value::from("x")]));
        query.set_first_result(10);
        query.set_max_results(5);

        assert_eq!(query.text(), "SELECT x FROM X AS x ");
        assert_eq!(query.parameter_names(), vec!["a_0", "b_1"]);
        assert_eq!(query.parameter("a_0"), Some(&BoundValue::Single(Value::Int(1))));
        assert_eq!(query.first_result, Some(10));
        assert_eq!(query.max_results, Some(5));
        assert_eq!(query.collection_size, None);
    }

    #[test]
    fn test_collection_filter_records_size() {
        let session = RecordingSession::new();
        let children = vec![Instance::new("example.Book").with("id", 2i64)];
        let query = session.create_filter(&children, " order by title asc");
        assert_eq!(query.collection_size, Some(1));
    }
}
