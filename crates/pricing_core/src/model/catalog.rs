//! Catalog items and their per-store listings.

use super::chain::StoreKey;
use super::unit::Unit;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

pub type ItemId = i64;
pub type StoreProductId = i64;

/// A catalog item (SKU). Equality and hashing use the surrogate `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    /// Vendor item code.
    pub code: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Unit,
}

impl Item {
    pub fn new(code: impl Into<String>, quantity: Decimal, unit: Unit) -> Self {
        Self {
            id: None,
            code: Some(code.into()),
            quantity: Some(quantity),
            unit,
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}: {id}", self.code.as_deref().unwrap_or_default()),
            None => write!(f, "{}: unsaved", self.code.as_deref().unwrap_or_default()),
        }
    }
}

/// The listing of an item at a store.
///
/// `name`, `quantity` and `unit_quantity` keep the vendor's raw text so rows
/// whose quantity/unit could not be parsed can be reconciled by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProduct {
    pub id: Option<StoreProductId>,
    pub item_id: Option<ItemId>,
    pub store_id: Option<StoreKey>,
    /// Vendor-internal product id.
    pub internal_id: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit_quantity: Option<String>,
}

impl StoreProduct {
    pub fn new(item_id: ItemId, store_id: StoreKey) -> Self {
        Self {
            id: None,
            item_id: Some(item_id),
            store_id: Some(store_id),
            internal_id: None,
            name: None,
            quantity: None,
            unit_quantity: None,
        }
    }
}
