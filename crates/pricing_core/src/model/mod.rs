//! Retail pricing domain model.
//!
//! # Responsibility
//! - Define the entities persisted by the access layer and their
//!   enumerations.
//! - Host the only embedded business rule: unit-label normalization.
//!
//! # Invariants
//! - Surrogate ids are `None` until the row is persisted.
//! - Entities reference each other by id; nothing here owns another entity.
//! - This module performs no I/O.

pub mod catalog;
pub mod chain;
pub mod pricing;
pub mod promotion;
pub mod unit;

pub use catalog::{Item, ItemId, StoreProduct, StoreProductId};
pub use chain::{Chain, ChainId, ChainWebAccess, Store, StoreKey, StoreType};
pub use pricing::{CurrentPrice, PriceHistory, PriceHistoryId};
pub use promotion::{
    PriceFunction, PriceFunctionType, Promotion, PromotionId, PromotionItem, Restriction,
    RestrictionId, RestrictionType,
};
pub use unit::Unit;
