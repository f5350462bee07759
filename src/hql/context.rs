//! Per-build state: join aliases, emitted join fragments, parameter names and
//! the values bound to them.
//!
//! A fresh [`BuildContext`] is created at the start of every `build()` and
//! consumed at its end, so nothing here can leak from one build to the next.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::ast::JoinFragment;
use crate::filter::{BoundValue, PathElement};

#[derive(Debug, Default)]
pub struct BuildContext {
    /// `(source alias, field)` → alias of the joined hop.
    aliases: HashMap<(String, String), String>,
    taken: HashSet<String>,
    joins: Vec<JoinFragment>,
    next_parameter: usize,
    bindings: Vec<(String, BoundValue)>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an alias as used by something other than a join, e.g. the root
    /// entity alias.
    pub fn reserve(&mut self, alias: &str) {
        self.taken.insert(alias.to_string());
    }

    /// Join `element` from `source` and return the alias of the joined hop.
    ///
    /// The same hop from the same source always yields the same alias and
    /// emits its fragment only once. A different hop whose natural alias is
    /// already in use gets a numeric suffix.
    pub fn join(&mut self, source: &str, element: &PathElement) -> String {
        let key = (source.to_string(), element.field().to_string());
        if let Some(alias) = self.aliases.get(&key) {
            trace!(source, field = element.field(), alias = %alias, "join already emitted");
            return alias.clone();
        }

        let base = element.alias();
        let mut alias = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&alias) {
            alias = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let fragment = JoinFragment {
            source: source.to_string(),
            field: element.field().to_string(),
            alias: alias.clone(),
        };
        debug!(source, field = element.field(), alias = %alias, "emitting join");

        self.taken.insert(alias.clone());
        self.aliases.insert(key, alias.clone());
        self.joins.push(fragment);
        alias
    }

    /// A parameter name unique within this build: `stem` plus a counter.
    pub fn parameter_name(&mut self, stem: &str) -> String {
        let name = format!("{}_{}", stem, self.next_parameter);
        self.next_parameter += 1;
        name
    }

    pub fn bind(&mut self, name: String, value: BoundValue) {
        trace!(parameter = %name, value = ?value, "binding parameter");
        self.bindings.push((name, value));
    }

    pub fn joins(&self) -> &[JoinFragment] {
        &self.joins
    }

    pub fn bindings(&self) -> &[(String, BoundValue)] {
        &self.bindings
    }

    /// Emitted joins in first-occurrence order, and the parameter bindings.
    pub fn into_parts(self) -> (Vec<JoinFragment>, Vec<(String, BoundValue)>) {
        (self.joins, self.bindings)
    }
}
