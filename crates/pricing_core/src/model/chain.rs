//! Retail chains, their storefronts and scraping credentials.
//!
//! # Invariants
//! - `(full_id, subchain_id)` identifies one chain.
//! - `(store_id, chain_id)` identifies one store.
//! - A chain has at most one `ChainWebAccess` row.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

pub type ChainId = i64;
pub type StoreKey = i64;

/// A retail chain, optionally split into subchains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Surrogate key, `None` until persisted.
    pub id: Option<ChainId>,
    /// External chain number published by the vendor.
    pub full_id: i64,
    /// Subchain number, `0` when the chain has no subchains. Never `NULL`
    /// in storage, so `(full_id, subchain_id)` stays unique.
    pub subchain_id: i64,
    pub name: Option<String>,
}

impl Chain {
    pub fn new(full_id: i64, subchain_id: i64, name: impl Into<String>) -> Self {
        Self {
            id: None,
            full_id,
            subchain_id,
            name: Some(name.into()),
        }
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or_default())
    }
}

/// Credentials used to fetch a chain's published price files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainWebAccess {
    /// Also the primary key: one row per chain.
    pub chain_id: ChainId,
    pub url: Option<String>,
    pub username: String,
    pub password: String,
}

impl ChainWebAccess {
    pub fn new(chain_id: ChainId, url: impl Into<String>) -> Self {
        Self {
            chain_id,
            url: Some(url.into()),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Where a store sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    Physical,
    Web,
    Both,
}

impl StoreType {
    pub fn code(self) -> u8 {
        match self {
            Self::Physical => 1,
            Self::Web => 2,
            Self::Both => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Web => "web",
            Self::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "physical" => Some(Self::Physical),
            "web" => Some(Self::Web),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// A storefront of a chain.
///
/// Equality and hashing use the surrogate `id` only; two unsaved stores
/// (both `id == None`) compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Option<StoreKey>,
    /// Store number within its chain.
    pub store_id: Option<i64>,
    pub chain_id: Option<ChainId>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: Option<StoreType>,
}

impl Store {
    pub fn new(store_id: i64, chain_id: ChainId, name: impl Into<String>, kind: StoreType) -> Self {
        Self {
            id: None,
            store_id: Some(store_id),
            chain_id: Some(chain_id),
            name: Some(name.into()),
            city: None,
            address: String::new(),
            kind: Some(kind),
        }
    }

    /// Human-readable label in `chain-store:address` form.
    pub fn describe(&self, chain: &Chain) -> String {
        format!(
            "{}-{}:{}",
            chain,
            self.name.as_deref().unwrap_or_default(),
            self.address
        )
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Store {}

impl Hash for Store {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::{Chain, Store, StoreType};
    use std::collections::HashSet;

    #[test]
    fn stores_compare_by_surrogate_id_only() {
        let mut downtown = Store::new(1, 7, "Downtown", StoreType::Physical);
        let mut renamed = Store::new(2, 7, "Renamed", StoreType::Web);
        downtown.id = Some(10);
        renamed.id = Some(10);
        assert_eq!(downtown, renamed);

        renamed.id = Some(11);
        let set: HashSet<Store> = [downtown, renamed].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn describe_includes_chain_name_and_address() {
        let chain = Chain::new(100, 0, "Acme");
        let mut store = Store::new(1, 1, "Downtown", StoreType::Physical);
        store.address = "1 Main St".to_string();
        assert_eq!(store.describe(&chain), "Acme-Downtown:1 Main St");
    }
}
