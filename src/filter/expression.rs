//! Filter expression tree.
//!
//! Predicates combined with AND/OR (and NOT). Traversal is plain recursion over
//! the variants: [`FilterExpression::flatten`] collects predicates left to
//! right, and [`FilterExpression::map_predicates`] produces a rewritten copy,
//! leaving the caller's tree untouched.

use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use super::predicate::FilterPredicate;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterExpression {
    Predicate(FilterPredicate),
    And(Box<FilterExpression>, Box<FilterExpression>),
    Or(Box<FilterExpression>, Box<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    pub fn and(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::And(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn or(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::Or(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn negate(inner: impl Into<Self>) -> Self {
        Self::Not(Box::new(inner.into()))
    }

    /// All predicates in the tree, in left-to-right order.
    pub fn flatten(&self) -> Vec<&FilterPredicate> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a FilterPredicate>) {
        match self {
            Self::Predicate(p) => out.push(p),
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect(out);
                right.collect(out);
            }
            Self::Not(inner) => inner.collect(out),
        }
    }

    /// Structural copy with every predicate replaced by `f(predicate)`.
    pub fn map_predicates<F>(&self, f: &mut F) -> Result<Self>
    where
        F: FnMut(&FilterPredicate) -> Result<FilterPredicate>,
    {
        Ok(match self {
            Self::Predicate(p) => Self::Predicate(f(p)?),
            Self::And(left, right) => Self::And(
                Box::new(left.map_predicates(f)?),
                Box::new(right.map_predicates(f)?),
            ),
            Self::Or(left, right) => Self::Or(
                Box::new(left.map_predicates(f)?),
                Box::new(right.map_predicates(f)?),
            ),
            Self::Not(inner) => Self::Not(Box::new(inner.map_predicates(f)?)),
        })
    }

    /// Fold a list of expressions with AND; `None` when the list is empty.
    pub fn conjunction(exprs: impl IntoIterator<Item = Self>) -> Option<Self> {
        exprs.into_iter().reduce(|left, right| Self::and(left, right))
    }

    /// Fold a list of expressions with OR; `None` when the list is empty.
    pub fn disjunction(exprs: impl IntoIterator<Item = Self>) -> Option<Self> {
        exprs.into_iter().reduce(|left, right| Self::or(left, right))
    }
}

impl From<FilterPredicate> for FilterExpression {
    fn from(predicate: FilterPredicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl BitAnd for FilterExpression {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(self, rhs)
    }
}

impl BitOr for FilterExpression {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(self, rhs)
    }
}

impl Not for FilterExpression {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::negate(self)
    }
}
