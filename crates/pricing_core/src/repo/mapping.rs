//! Table mapping for every domain entity: columns, declared keys, row
//! decoding and relationships.
//!
//! # Invariants
//! - Column constants and `COLUMNS` follow the table definitions in
//!   `db/migrations/0001_pricing.sql`.
//! - Relationship load strategies are declared here and nowhere else.

use super::entity::{
    date_column, decimal_column, enum_column, required, Column, Entity, IntoValue,
};
use super::relation::{LoadStrategy, Relation};
use super::RepoResult;
use crate::model::{
    Chain, ChainWebAccess, CurrentPrice, Item, PriceFunction, PriceFunctionType, PriceHistory,
    Promotion, PromotionItem, Restriction, RestrictionType, Store, StoreProduct, StoreType, Unit,
};
use rusqlite::types::Value;
use rusqlite::Row;

impl Chain {
    pub const ID: Column<Chain> = Column::new("id");
    pub const FULL_ID: Column<Chain> = Column::new("full_id");
    pub const SUBCHAIN_ID: Column<Chain> = Column::new("subchain_id");
    pub const NAME: Column<Chain> = Column::new("name");

    /// Stores of the chain. On demand.
    pub const STORES: Relation<Chain, Store> =
        Relation::new("stores", Chain::ID, Store::CHAIN_ID, LoadStrategy::OnDemand);
    /// Scraping credentials, at most one row. On demand.
    pub const WEB_ACCESS: Relation<Chain, ChainWebAccess> = Relation::new(
        "web_access",
        Chain::ID,
        ChainWebAccess::CHAIN_ID,
        LoadStrategy::OnDemand,
    );
}

impl Entity for Chain {
    const TABLE: &'static str = "chains";
    const COLUMNS: &'static [&'static str] = &["id", "full_id", "subchain_id", "name"];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.full_id.into_value(),
            self.subchain_id.into_value(),
            (&self.name).into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            full_id: row.get("full_id")?,
            subchain_id: row.get("subchain_id")?,
            name: row.get("name")?,
        })
    }
}

impl ChainWebAccess {
    pub const CHAIN_ID: Column<ChainWebAccess> = Column::new("chain_id");
    pub const URL: Column<ChainWebAccess> = Column::new("url");
    pub const USERNAME: Column<ChainWebAccess> = Column::new("username");
    pub const PASSWORD: Column<ChainWebAccess> = Column::new("password");
}

impl Entity for ChainWebAccess {
    const TABLE: &'static str = "web_access";
    const COLUMNS: &'static [&'static str] = &["chain_id", "url", "username", "password"];
    const KEY: &'static [&'static str] = &["chain_id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.chain_id.into_value(),
            (&self.url).into_value(),
            (&self.username).into_value(),
            (&self.password).into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            chain_id: row.get("chain_id")?,
            url: row.get("url")?,
            username: row.get("username")?,
            password: row.get("password")?,
        })
    }
}

impl Store {
    pub const ID: Column<Store> = Column::new("id");
    pub const STORE_ID: Column<Store> = Column::new("store_id");
    pub const CHAIN_ID: Column<Store> = Column::new("chain_id");
    pub const NAME: Column<Store> = Column::new("name");
    pub const CITY: Column<Store> = Column::new("city");
    pub const ADDRESS: Column<Store> = Column::new("address");
    pub const TYPE: Column<Store> = Column::new("type");

    /// Listings of the store. On demand.
    pub const PRODUCTS: Relation<Store, StoreProduct> = Relation::new(
        "store_products",
        Store::ID,
        StoreProduct::STORE_ID,
        LoadStrategy::OnDemand,
    );
    /// Promotions run by the store. On demand.
    pub const PROMOTIONS: Relation<Store, Promotion> = Relation::new(
        "promotions",
        Store::ID,
        Promotion::STORE_ID,
        LoadStrategy::OnDemand,
    );
}

impl Entity for Store {
    const TABLE: &'static str = "stores";
    const COLUMNS: &'static [&'static str] = &[
        "id", "store_id", "chain_id", "name", "city", "address", "type",
    ];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.store_id.into_value(),
            self.chain_id.into_value(),
            (&self.name).into_value(),
            (&self.city).into_value(),
            (&self.address).into_value(),
            self.kind.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            store_id: row.get("store_id")?,
            chain_id: row.get("chain_id")?,
            name: row.get("name")?,
            city: row.get("city")?,
            address: row.get("address")?,
            kind: enum_column(row, Self::TABLE, "type", StoreType::parse)?,
        })
    }
}

impl Item {
    pub const ID: Column<Item> = Column::new("id");
    pub const CODE: Column<Item> = Column::new("code");
    pub const QUANTITY: Column<Item> = Column::new("quantity");
    pub const UNIT: Column<Item> = Column::new("unit");

    /// Listings of the item across stores. Eager: items are almost always
    /// read together with where they are sold.
    pub const STORE_PRODUCTS: Relation<Item, StoreProduct> = Relation::new(
        "store_products",
        Item::ID,
        StoreProduct::ITEM_ID,
        LoadStrategy::Eager,
    );
}

impl Entity for Item {
    const TABLE: &'static str = "items";
    const COLUMNS: &'static [&'static str] = &["id", "code", "quantity", "unit"];
    const KEY: &'static [&'static str] = &["id"];
    const DECIMAL_COLUMNS: &'static [&'static str] = &["quantity"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            (&self.code).into_value(),
            self.quantity.into_value(),
            self.unit.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            quantity: decimal_column(row, Self::TABLE, "quantity")?,
            unit: enum_column(row, Self::TABLE, "unit", Unit::parse)?.unwrap_or_default(),
        })
    }
}

impl StoreProduct {
    pub const ID: Column<StoreProduct> = Column::new("id");
    pub const ITEM_ID: Column<StoreProduct> = Column::new("item_id");
    pub const STORE_ID: Column<StoreProduct> = Column::new("store_id");
    pub const INTERNAL_ID: Column<StoreProduct> = Column::new("internal_id");
    pub const NAME: Column<StoreProduct> = Column::new("name");
    pub const QUANTITY: Column<StoreProduct> = Column::new("quantity");
    pub const UNIT_QUANTITY: Column<StoreProduct> = Column::new("unit_quantity");

    /// Current price rows of the listing. On demand.
    pub const CURRENT_PRICES: Relation<StoreProduct, CurrentPrice> = Relation::new(
        "current_prices",
        StoreProduct::ID,
        CurrentPrice::STORE_PRODUCT_ID,
        LoadStrategy::OnDemand,
    );
    /// Price-validity intervals of the listing. On demand.
    pub const PRICE_HISTORY: Relation<StoreProduct, PriceHistory> = Relation::new(
        "prices_history",
        StoreProduct::ID,
        PriceHistory::STORE_PRODUCT_ID,
        LoadStrategy::OnDemand,
    );
}

impl Entity for StoreProduct {
    const TABLE: &'static str = "store_products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "item_id",
        "store_id",
        "internal_id",
        "name",
        "quantity",
        "unit_quantity",
    ];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.item_id.into_value(),
            self.store_id.into_value(),
            self.internal_id.into_value(),
            (&self.name).into_value(),
            (&self.quantity).into_value(),
            (&self.unit_quantity).into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            item_id: row.get("item_id")?,
            store_id: row.get("store_id")?,
            internal_id: row.get("internal_id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            unit_quantity: row.get("unit_quantity")?,
        })
    }
}

impl PriceHistory {
    pub const ID: Column<PriceHistory> = Column::new("id");
    pub const STORE_PRODUCT_ID: Column<PriceHistory> = Column::new("store_product_id");
    pub const START_DATE: Column<PriceHistory> = Column::new("start_date");
    pub const END_DATE: Column<PriceHistory> = Column::new("end_date");
}

impl Entity for PriceHistory {
    const TABLE: &'static str = "price_history";
    const COLUMNS: &'static [&'static str] = &["id", "store_product_id", "start_date", "end_date"];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.store_product_id.into_value(),
            self.start_date.into_value(),
            self.end_date.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            store_product_id: row.get("store_product_id")?,
            start_date: required(
                date_column(row, Self::TABLE, "start_date")?,
                Self::TABLE,
                "start_date",
            )?,
            end_date: required(
                date_column(row, Self::TABLE, "end_date")?,
                Self::TABLE,
                "end_date",
            )?,
        })
    }
}

impl CurrentPrice {
    pub const STORE_PRODUCT_ID: Column<CurrentPrice> = Column::new("store_product_id");
    pub const PRICE: Column<CurrentPrice> = Column::new("price");
}

impl Entity for CurrentPrice {
    const TABLE: &'static str = "current_price";
    const COLUMNS: &'static [&'static str] = &["store_product_id", "price"];
    const KEY: &'static [&'static str] = &["price"];
    const DECIMAL_COLUMNS: &'static [&'static str] = &["price"];

    fn values(&self) -> Vec<Value> {
        vec![self.store_product_id.into_value(), self.price.into_value()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            store_product_id: row.get("store_product_id")?,
            price: required(
                decimal_column(row, Self::TABLE, "price")?,
                Self::TABLE,
                "price",
            )?,
        })
    }
}

impl Promotion {
    pub const ID: Column<Promotion> = Column::new("id");
    pub const STORE_ID: Column<Promotion> = Column::new("store_id");
    pub const INTERNAL_PROMOTION_CODE: Column<Promotion> = Column::new("internal_promotion_code");
    pub const DESCRIPTION: Column<Promotion> = Column::new("description");
    pub const START_DATE: Column<Promotion> = Column::new("start_date");
    pub const END_DATE: Column<Promotion> = Column::new("end_date");

    /// Eligible items. Eager.
    pub const ITEMS: Relation<Promotion, PromotionItem> = Relation::new(
        "items",
        Promotion::ID,
        PromotionItem::PROMOTION_ID,
        LoadStrategy::Eager,
    );
    /// Eligibility rules. Eager.
    pub const RESTRICTIONS: Relation<Promotion, Restriction> = Relation::new(
        "restrictions",
        Promotion::ID,
        Restriction::PROMOTION_ID,
        LoadStrategy::Eager,
    );
    /// Price rule, at most one row. On demand.
    pub const PRICE_FUNCTION: Relation<Promotion, PriceFunction> = Relation::new(
        "price_func",
        Promotion::ID,
        PriceFunction::PROMOTION_ID,
        LoadStrategy::OnDemand,
    );
}

impl Entity for Promotion {
    const TABLE: &'static str = "promotions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "store_id",
        "internal_promotion_code",
        "description",
        "start_date",
        "end_date",
    ];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.store_id.into_value(),
            self.internal_promotion_code.into_value(),
            (&self.description).into_value(),
            self.start_date.into_value(),
            self.end_date.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            store_id: row.get("store_id")?,
            internal_promotion_code: row.get("internal_promotion_code")?,
            description: row.get("description")?,
            start_date: date_column(row, Self::TABLE, "start_date")?,
            end_date: date_column(row, Self::TABLE, "end_date")?,
        })
    }
}

impl PromotionItem {
    pub const PROMOTION_ID: Column<PromotionItem> = Column::new("promotion_id");
    pub const ITEM_ID: Column<PromotionItem> = Column::new("item_id");
}

impl Entity for PromotionItem {
    const TABLE: &'static str = "promotion_items";
    const COLUMNS: &'static [&'static str] = &["promotion_id", "item_id"];
    const KEY: &'static [&'static str] = &["promotion_id", "item_id"];

    fn values(&self) -> Vec<Value> {
        vec![self.promotion_id.into_value(), self.item_id.into_value()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            promotion_id: row.get("promotion_id")?,
            item_id: row.get("item_id")?,
        })
    }
}

impl Restriction {
    pub const ID: Column<Restriction> = Column::new("id");
    pub const PROMOTION_ID: Column<Restriction> = Column::new("promotion_id");
    pub const RESTRICTION_TYPE: Column<Restriction> = Column::new("restriction_type");
    pub const AMOUNT: Column<Restriction> = Column::new("amount");
    pub const ITEM_ID: Column<Restriction> = Column::new("item_id");
}

impl Entity for Restriction {
    const TABLE: &'static str = "restrictions";
    const COLUMNS: &'static [&'static str] =
        &["id", "promotion_id", "restriction_type", "amount", "item_id"];
    const KEY: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into_value(),
            self.promotion_id.into_value(),
            self.restriction_type.into_value(),
            self.amount.into_value(),
            self.item_id.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            promotion_id: row.get("promotion_id")?,
            restriction_type: required(
                enum_column(row, Self::TABLE, "restriction_type", RestrictionType::parse)?,
                Self::TABLE,
                "restriction_type",
            )?,
            amount: row.get("amount")?,
            item_id: row.get("item_id")?,
        })
    }
}

impl PriceFunction {
    pub const PROMOTION_ID: Column<PriceFunction> = Column::new("promotion_id");
    pub const FUNCTION_TYPE: Column<PriceFunction> = Column::new("function_type");
    pub const VALUE: Column<PriceFunction> = Column::new("value");
}

impl Entity for PriceFunction {
    const TABLE: &'static str = "price_functions";
    const COLUMNS: &'static [&'static str] = &["promotion_id", "function_type", "value"];
    const KEY: &'static [&'static str] = &["promotion_id"];
    const DECIMAL_COLUMNS: &'static [&'static str] = &["value"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.promotion_id.into_value(),
            self.function_type.into_value(),
            self.value.into_value(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            promotion_id: row.get("promotion_id")?,
            function_type: required(
                enum_column(row, Self::TABLE, "function_type", PriceFunctionType::parse)?,
                Self::TABLE,
                "function_type",
            )?,
            value: required(
                decimal_column(row, Self::TABLE, "value")?,
                Self::TABLE,
                "value",
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Entity;
    use rusqlite::types::Value;
    use crate::model::{
        Chain, ChainWebAccess, CurrentPrice, Item, PriceFunction, PriceHistory, Promotion,
        PromotionItem, Restriction, Store, StoreProduct,
    };

    fn assert_key_declared<T: Entity>() {
        assert!(!T::KEY.is_empty(), "{} has no key", T::TABLE);
        for key in T::KEY {
            assert!(T::COLUMNS.contains(key), "{}.{key} not a column", T::TABLE);
        }
        for column in T::DECIMAL_COLUMNS {
            assert!(T::COLUMNS.contains(column), "{}.{column} not a column", T::TABLE);
        }
    }

    #[test]
    fn every_key_is_a_declared_column() {
        assert_key_declared::<Chain>();
        assert_key_declared::<ChainWebAccess>();
        assert_key_declared::<Store>();
        assert_key_declared::<Item>();
        assert_key_declared::<StoreProduct>();
        assert_key_declared::<PriceHistory>();
        assert_key_declared::<CurrentPrice>();
        assert_key_declared::<Promotion>();
        assert_key_declared::<PromotionItem>();
        assert_key_declared::<Restriction>();
        assert_key_declared::<PriceFunction>();
    }

    #[test]
    fn values_follow_column_order() {
        let chain = Chain::new(100, 3, "Acme");
        let values = chain.values();
        assert_eq!(values.len(), Chain::COLUMNS.len());
        assert_eq!(chain.value_of("subchain_id"), Some(Value::Integer(3)));
        assert_eq!(chain.value_of("missing"), None);
    }
}
