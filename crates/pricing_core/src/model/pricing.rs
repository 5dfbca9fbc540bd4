//! Price snapshots and price-validity intervals of store listings.
//!
//! # Invariants
//! - `(start_date, store_product_id)` identifies one history row.
//! - Overlapping intervals of the same listing are not rejected; writers own
//!   interval consistency.
//! - `CurrentPrice` is keyed by `price`. Keeping one current row per listing
//!   is left to the writer.

use super::catalog::StoreProductId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type PriceHistoryId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: Option<PriceHistoryId>,
    pub store_product_id: Option<StoreProductId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PriceHistory {
    pub fn new(store_product_id: StoreProductId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            store_product_id: Some(store_product_id),
            start_date,
            end_date,
        }
    }

    /// Whether `day` falls inside the closed interval.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub store_product_id: Option<StoreProductId>,
    pub price: Decimal,
}

impl CurrentPrice {
    pub fn new(store_product_id: StoreProductId, price: Decimal) -> Self {
        Self {
            store_product_id: Some(store_product_id),
            price,
        }
    }
}
