//! Lazily evaluated, composable queries.
//!
//! A `Query` is plain data until it is executed against a session, so it can
//! be built, cloned and refined freely before any SQL runs.

use super::entity::{Column, Entity};
use super::filter::{quote_ident, Condition};
use super::session::SessionController;
use super::RepoResult;
use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Query scoped to entity `T`. Filters are ANDed in the order added.
#[derive(Debug, Clone)]
pub struct Query<T> {
    conditions: Vec<Condition<T>>,
    order_by: Vec<(Column<T>, Order)>,
    limit: Option<u32>,
}

impl<T: Entity> Query<T> {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, condition: Condition<T>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, column: Column<T>, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[Condition<T>] {
        &self.conditions
    }

    /// Runs the query and decodes every matching row.
    pub fn all(&self, session: &SessionController) -> RepoResult<Vec<T>> {
        session.fetch(self)
    }

    /// First matching row, `None` when nothing matches.
    pub fn first(&self, session: &SessionController) -> RepoResult<Option<T>> {
        let mut rows = session.fetch(&self.clone_with_limit(1))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    pub fn count(&self, session: &SessionController) -> RepoResult<u64> {
        session.count(self)
    }

    pub fn exists(&self, session: &SessionController) -> RepoResult<bool> {
        Ok(self.clone_with_limit(1).count(session)? > 0)
    }

    /// Appends ` WHERE ...` when the query has filters.
    pub(crate) fn render_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.conditions.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                sql.push_str(" AND ");
            }
            condition.render(sql, params);
        }
    }

    pub(crate) fn select_sql(&self) -> (String, Vec<Value>) {
        let columns = T::COLUMNS
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", quote_ident(T::TABLE));
        let mut params = Vec::new();
        self.render_where(&mut sql, &mut params);

        if self.order_by.is_empty() {
            sql.push_str(" ORDER BY rowid ASC");
        } else {
            let order = self
                .order_by
                .iter()
                .map(|(column, order)| {
                    let direction = match order {
                        Order::Asc => "ASC",
                        Order::Desc => "DESC",
                    };
                    format!("{} {direction}", column.ordering_operand())
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::from(limit)));
        }
        (sql, params)
    }

    fn clone_with_limit(&self, limit: u32) -> Self {
        Self {
            conditions: self.conditions.clone(),
            order_by: self.order_by.clone(),
            limit: Some(self.limit.map_or(limit, |current| current.min(limit))),
        }
    }
}

impl<T: Entity> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, Query};
    use crate::model::Store;
    use rusqlite::types::Value;

    #[test]
    fn select_lists_declared_columns_and_default_order() {
        let (sql, params) = Query::<Store>::new().filter(Store::STORE_ID.eq(1)).select_sql();
        assert_eq!(
            sql,
            "SELECT \"id\", \"store_id\", \"chain_id\", \"name\", \"city\", \"address\", \"type\" \
             FROM \"stores\" WHERE \"store_id\" = ? ORDER BY rowid ASC"
        );
        assert_eq!(params, vec![Value::Integer(1)]);
    }

    #[test]
    fn explicit_order_and_limit() {
        let (sql, params) = Query::<Store>::new()
            .order_by(Store::NAME, Order::Desc)
            .limit(5)
            .select_sql();
        assert!(sql.ends_with("ORDER BY \"name\" DESC LIMIT ?"));
        assert_eq!(params, vec![Value::Integer(5)]);
    }
}
