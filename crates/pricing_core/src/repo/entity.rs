//! Entity descriptors, typed column selectors and value conversion.
//!
//! # Responsibility
//! - Describe each persisted type (table, columns, declared key) so the
//!   session can stay generic.
//! - Convert domain values to and from SQLite storage values.
//!
//! # Invariants
//! - `Entity::values()` yields one value per `Entity::COLUMNS` entry, in the
//!   same order.
//! - `Entity::KEY` is a subset of `Entity::COLUMNS`, in declaration order.
//! - Decimals are stored normalized, so equal amounts have equal text.
//! - Range comparisons and ordering on `DECIMAL_COLUMNS` go through
//!   `CAST(... AS NUMERIC)`; equality and `LIKE` use the canonical text.

use super::{RepoError, RepoResult};
use crate::model::{PriceFunctionType, RestrictionType, StoreType, Unit};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::str::FromStr;

/// A persisted type the session can query and write generically.
pub trait Entity: Sized + Clone + Debug {
    const TABLE: &'static str;
    /// Every stored column, in declaration order.
    const COLUMNS: &'static [&'static str];
    /// Declared primary-key columns, in declaration order.
    const KEY: &'static [&'static str];
    /// Columns holding `Decimal` text. Ordering on them is numeric.
    const DECIMAL_COLUMNS: &'static [&'static str] = &[];

    /// Projects the instance onto `COLUMNS`.
    fn values(&self) -> Vec<Value>;

    /// Decodes one row selected with `COLUMNS`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Value of one column, `None` when the column is not declared.
    fn value_of(&self, column: &str) -> Option<Value> {
        let index = Self::COLUMNS.iter().position(|name| *name == column)?;
        self.values().into_iter().nth(index)
    }

    /// Projects the instance onto `KEY`.
    fn key_values(&self) -> Vec<Value> {
        let values = self.values();
        Self::KEY
            .iter()
            .filter_map(|key| Self::COLUMNS.iter().position(|name| name == key))
            .map(|index| values[index].clone())
            .collect()
    }
}

/// Typed selector for one column of entity `T`.
pub struct Column<T> {
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Column<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> Debug for Column<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column({})", self.name)
    }
}

/// Conversion into a bound SQLite value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for Decimal {
    fn into_value(self) -> Value {
        Value::Text(self.normalize().to_string())
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl IntoValue for Unit {
    fn into_value(self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl IntoValue for StoreType {
    fn into_value(self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl IntoValue for RestrictionType {
    fn into_value(self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl IntoValue for PriceFunctionType {
    fn into_value(self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl<V: IntoValue> IntoValue for Option<V> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<V: IntoValue + Clone> IntoValue for &Option<V> {
    fn into_value(self) -> Value {
        self.clone().into_value()
    }
}

/// Ordered column→value mapping for one entity type.
///
/// Setting a column twice keeps the last value in the first position.
pub struct Fields<T> {
    entries: Vec<(&'static str, Value)>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Fields<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _entity: PhantomData,
        }
    }

    pub fn set(mut self, column: Column<T>, value: impl IntoValue) -> Self {
        let value = value.into_value();
        match self.entries.iter_mut().find(|(name, _)| *name == column.name()) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.name(), value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, value)| value.clone()).collect()
    }

    pub fn entries(&self) -> &[(&'static str, Value)] {
        &self.entries
    }
}

impl<T: Entity> Fields<T> {
    /// Rejects columns `T` does not declare.
    pub(crate) fn validate(&self) -> RepoResult<()> {
        for (name, _) in &self.entries {
            if !T::COLUMNS.contains(name) {
                return Err(RepoError::UnknownColumn {
                    table: T::TABLE,
                    column: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<T> Default for Fields<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Fields<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> Debug for Fields<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, value)| (name, value)))
            .finish()
    }
}

pub(crate) fn decimal_column(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<Decimal>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Decimal::from_str(&text).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid decimal `{text}` in {table}.{column}"))
        }),
        None => Ok(None),
    }
}

pub(crate) fn date_column(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in {table}.{column}"))
            }),
        None => Ok(None),
    }
}

pub(crate) fn enum_column<E>(
    row: &Row<'_>,
    table: &str,
    column: &str,
    parse: fn(&str) -> Option<E>,
) -> RepoResult<Option<E>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid value `{text}` in {table}.{column}"))
        }),
        None => Ok(None),
    }
}

pub(crate) fn required<V>(value: Option<V>, table: &str, column: &str) -> RepoResult<V> {
    value.ok_or_else(|| RepoError::InvalidData(format!("missing value in {table}.{column}")))
}

#[cfg(test)]
mod tests {
    use super::IntoValue;
    use chrono::NaiveDate;
    use rusqlite::types::Value;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn decimals_are_normalized_before_binding() {
        let price = Decimal::from_str("12.50").unwrap();
        assert_eq!(price.into_value(), Value::Text("12.5".to_string()));
        assert_eq!(Decimal::ZERO.into_value(), Value::Text("0".to_string()));
    }

    #[test]
    fn dates_bind_as_iso_text() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day.into_value(), Value::Text("2024-03-07".to_string()));
    }

    #[test]
    fn none_binds_as_null() {
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(Some("a").into_value(), Value::Text("a".to_string()));
    }
}
