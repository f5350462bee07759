//! Query builders: filter, sort and pagination in, bound query handle out.
//!
//! ```text
//! FilterExpression ──flatten──▶ predicates ──joins.rs──▶ JOIN fragments + aliases
//!        │                                                   │
//!        └──────────────render.rs──────────────▶ WHERE condition + bindings
//! Sorting ──clauses.rs──▶ ORDER BY terms          Pagination ──▶ offset/limit
//! ```
//!
//! Per-build state lives in a [`BuildContext`] created and dropped inside each
//! `build()`.

pub mod builder;
pub mod clauses;
pub mod context;
pub mod joins;
pub mod page_totals;
pub mod render;
pub mod root;
pub mod sub_collection;

pub use builder::{BuilderState, CollectionFetch, QueryBuilder, Relationship};
pub use context::BuildContext;
pub use joins::{Aliasing, AttributeRef};
pub use page_totals::SubCollectionPageTotalsBuilder;
pub use root::RootCollectionFetchBuilder;
pub use sub_collection::SubCollectionFetchBuilder;
