//! Foreign-key relationships between entities and how they load.
//!
//! Each relationship declares its `LoadStrategy` next to its definition in
//! `mapping.rs`; nothing is loaded implicitly.

use super::entity::Column;
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Children are fetched together with their parents by `load`.
    Eager,
    /// Children are fetched only through an explicit `related` call.
    OnDemand,
}

/// One-to-many (or one-to-one) link from parent `P` to child `C`.
pub struct Relation<P, C> {
    pub name: &'static str,
    /// Column of `P` referenced by the child, usually its surrogate id.
    pub parent_key: Column<P>,
    /// Foreign-key column of `C`.
    pub child_column: Column<C>,
    pub strategy: LoadStrategy,
}

impl<P, C> Relation<P, C> {
    pub const fn new(
        name: &'static str,
        parent_key: Column<P>,
        child_column: Column<C>,
        strategy: LoadStrategy,
    ) -> Self {
        Self {
            name,
            parent_key,
            child_column,
            strategy,
        }
    }
}

impl<P, C> Clone for Relation<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Relation<P, C> {}

impl<P, C> Debug for Relation<P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("parent_key", &self.parent_key)
            .field("child_column", &self.child_column)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// A parent row with its children.
///
/// `children` is `None` when the relationship is on-demand and was not
/// fetched.
#[derive(Debug, Clone)]
pub struct Loaded<P, C> {
    pub parent: P,
    pub children: Option<Vec<C>>,
}
