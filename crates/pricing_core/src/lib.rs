//! Retail pricing data model and a generic SQLite access layer.
//!
//! `model` holds the plain domain types (chains, stores, items, listings,
//! prices, promotions) and unit normalization; `repo` persists any of them
//! through one `SessionController`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{DbError, DbResult, DEFAULT_DATABASE_URL};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Chain, ChainId, ChainWebAccess, CurrentPrice, Item, ItemId, PriceFunction,
    PriceFunctionType, PriceHistory, PriceHistoryId, Promotion, PromotionId, PromotionItem,
    Restriction, RestrictionId, RestrictionType, Store, StoreKey, StoreProduct, StoreProductId,
    StoreType, Unit,
};
pub use repo::{
    Column, Condition, Entity, Fields, LoadStrategy, Loaded, Order, Query, Relation, RepoError,
    RepoResult, SessionConfig, SessionController,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
