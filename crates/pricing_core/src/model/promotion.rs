//! Promotions, their eligible items, restrictions and price rules.
//!
//! # Invariants
//! - `(store_id, internal_promotion_code)` identifies one promotion.
//! - `(promotion_id, item_id)` identifies one eligible-item row.
//! - A promotion has at most one `PriceFunction`.
//! - `Restriction::amount` and `Restriction::item_id` are interpreted by
//!   `restriction_type`; the model does not cross-check them.

use super::catalog::ItemId;
use super::chain::StoreKey;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type PromotionId = i64;
pub type RestrictionId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Option<PromotionId>,
    pub store_id: Option<StoreKey>,
    /// Vendor promotion code, unique per store.
    pub internal_promotion_code: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Promotion {
    pub fn new(store_id: StoreKey, internal_promotion_code: i64, description: impl Into<String>) -> Self {
        Self {
            id: None,
            store_id: Some(store_id),
            internal_promotion_code: Some(internal_promotion_code),
            description: Some(description.into()),
            start_date: None,
            end_date: None,
        }
    }
}

/// Many-to-many link between a promotion and an eligible item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromotionItem {
    pub promotion_id: PromotionId,
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionType {
    MinQty,
    MaxQty,
    BasketPrice,
    ClubIds,
    SpecificItem,
}

impl RestrictionType {
    pub fn code(self) -> u8 {
        match self {
            Self::MinQty => 1,
            Self::MaxQty => 2,
            Self::BasketPrice => 3,
            Self::ClubIds => 4,
            Self::SpecificItem => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MinQty => "min_qty",
            Self::MaxQty => "max_qty",
            Self::BasketPrice => "basket_price",
            Self::ClubIds => "club_ids",
            Self::SpecificItem => "specific_item",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "min_qty" => Some(Self::MinQty),
            "max_qty" => Some(Self::MaxQty),
            "basket_price" => Some(Self::BasketPrice),
            "club_ids" => Some(Self::ClubIds),
            "specific_item" => Some(Self::SpecificItem),
            _ => None,
        }
    }
}

/// Eligibility rule gating a promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub id: Option<RestrictionId>,
    pub promotion_id: Option<PromotionId>,
    pub restriction_type: RestrictionType,
    pub amount: Option<i64>,
    /// Set for `SpecificItem` restrictions.
    pub item_id: Option<ItemId>,
}

impl Restriction {
    pub fn new(promotion_id: PromotionId, restriction_type: RestrictionType, amount: Option<i64>) -> Self {
        Self {
            id: None,
            promotion_id: Some(promotion_id),
            restriction_type,
            amount,
            item_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFunctionType {
    /// `value` is the price paid for the whole eligible bundle.
    TotalPrice,
    /// `value` is a percentage off.
    Percentage,
}

impl PriceFunctionType {
    pub fn code(self) -> u8 {
        match self {
            Self::TotalPrice => 1,
            Self::Percentage => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalPrice => "total_price",
            Self::Percentage => "percentage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "total_price" => Some(Self::TotalPrice),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// How a promotion adjusts price. One row per promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFunction {
    pub promotion_id: PromotionId,
    pub function_type: PriceFunctionType,
    pub value: Decimal,
}
