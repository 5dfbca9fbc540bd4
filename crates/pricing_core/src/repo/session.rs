//! Generic session over one SQLite connection.
//!
//! # Responsibility
//! - Translate entity-generic operations (lookup, existence checks,
//!   get-or-create, bulk writes, set-based updates) into SQL.
//! - Stage writes and persist them atomically on `commit`.
//!
//! # Invariants
//! - One session owns one connection; callers serialize access externally.
//! - Staged writes run in staging order, inside one transaction, only when
//!   `commit` is called. Reads observe committed state.
//! - `commit` never propagates a backend error: it logs, rolls back, clears
//!   the staged writes and returns `false`.
//! - `get_or_create` always commits before returning.
//! - Nothing here deletes rows; `drop_table` is the only destructive call.

use super::entity::{Column, Entity, Fields, IntoValue};
use super::filter::{quote_ident, Assignment, Condition};
use super::query::Query;
use super::relation::{LoadStrategy, Loaded, Relation};
use super::{RepoError, RepoResult};
use crate::db::{open_url, DbResult, DEFAULT_DATABASE_URL};
use log::{debug, error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::time::Instant;

pub const DEFAULT_LOG_TARGET: &str = "pricing_core::session";

/// Explicit session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend connection URL, see `db::DatabaseUrl`.
    pub database_url: String,
    /// Log every SQL statement with its parameters at info level.
    pub echo: bool,
    /// `log` target used for every session event.
    pub log_target: String,
}

impl SessionConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new("sqlite://")
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_log_target(mut self, log_target: impl Into<String>) -> Self {
        self.log_target = log_target.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            echo: false,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }
}

#[derive(Debug)]
struct PendingWrite {
    table: &'static str,
    sql: String,
    rows: Vec<Vec<Value>>,
}

pub struct SessionController {
    conn: Connection,
    config: SessionConfig,
    pending: Vec<PendingWrite>,
}

impl SessionController {
    /// Opens the configured backend and ensures every table exists.
    pub fn connect(config: SessionConfig) -> DbResult<Self> {
        info!(
            target: config.log_target.as_str(),
            "event=session_open module=session status=start url={}",
            config.database_url
        );
        let conn = open_url(&config.database_url)?;
        info!(
            target: config.log_target.as_str(),
            "event=session_open module=session status=ok echo={}",
            config.echo
        );
        Ok(Self::from_connection(conn, config))
    }

    /// Wraps an already opened and migrated connection.
    pub fn from_connection(conn: Connection, config: SessionConfig) -> Self {
        Self {
            conn,
            config,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Raw connection, for work the generic operations do not cover.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether writes are staged and not yet committed.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of staged statement executions.
    pub fn pending_writes(&self) -> usize {
        self.pending.iter().map(|write| write.rows.len()).sum()
    }

    pub fn query<T: Entity>(&self) -> Query<T> {
        Query::new()
    }

    pub fn filter_and<T: Entity>(&self, query: Query<T>, conditions: Vec<Condition<T>>) -> Query<T> {
        query.filter(Condition::and(conditions))
    }

    pub fn filter_or<T: Entity>(&self, query: Query<T>, conditions: Vec<Condition<T>>) -> Query<T> {
        query.filter(Condition::or(conditions))
    }

    pub fn filter_in<T: Entity, V: IntoValue>(
        &self,
        query: Query<T>,
        column: Column<T>,
        values: impl IntoIterator<Item = V>,
    ) -> Query<T> {
        query.filter(column.is_in(values))
    }

    /// New query over `T` restricted by `condition`.
    pub fn filter_condition<T: Entity>(&self, condition: Condition<T>) -> Query<T> {
        Query::new().filter(condition)
    }

    pub fn exists<T: Entity>(&self, column: Column<T>, value: impl IntoValue) -> RepoResult<bool> {
        Query::new().filter(column.eq(value)).exists(self)
    }

    /// Whether one row satisfies every `column = value` pair at once.
    ///
    /// # Errors
    /// - `RepoError::ArgumentMismatch` when the slices differ in length.
    pub fn exists_where_list<T: Entity>(
        &self,
        columns: &[Column<T>],
        values: Vec<Value>,
    ) -> RepoResult<bool> {
        if columns.len() != values.len() {
            return Err(RepoError::ArgumentMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        let condition = Condition::and(
            columns
                .iter()
                .copied()
                .zip(values)
                .map(|(column, value)| column.eq(value)),
        );
        Query::new().filter(condition).exists(self)
    }

    /// Declared primary-key columns of `T`.
    pub fn key<T: Entity>(&self) -> &'static [&'static str] {
        T::KEY
    }

    /// Key values of `instance`, ordered like `key::<T>()`.
    pub fn instance_key<T: Entity>(&self, instance: &T) -> Vec<Value> {
        instance.key_values()
    }

    /// Rows whose key columns match the instance's key values with SQL
    /// `LIKE`.
    ///
    /// `%` and `_` inside key values act as wildcards, and SQLite's `LIKE`
    /// ignores ASCII case. A `NULL` key value matches nothing.
    pub fn exists_in_db<T: Entity>(&self, instance: &T) -> RepoResult<Vec<T>> {
        let condition = Condition::and(
            T::KEY
                .iter()
                .zip(instance.key_values())
                .map(|(name, value)| Column::<T>::new(*name).like(value)),
        );
        Query::new().filter(condition).all(self)
    }

    /// First row equal to every given field, `None` when absent.
    pub fn get<T: Entity>(&self, fields: &Fields<T>) -> RepoResult<Option<T>> {
        fields.validate()?;
        Query::new().filter(match_fields(fields)).first(self)
    }

    /// Returns the row matching `fields`, inserting and committing it first
    /// when absent.
    ///
    /// The commit also persists every write staged earlier.
    ///
    /// # Errors
    /// - `RepoError::CommitFailed` when the insert cannot be committed; the
    ///   session is rolled back and clean afterwards.
    pub fn get_or_create<T: Entity>(&mut self, fields: Fields<T>) -> RepoResult<T> {
        if let Some(existing) = self.get(&fields)? {
            return Ok(existing);
        }

        let columns = fields.columns();
        self.stage(T::TABLE, insert_sql(T::TABLE, &columns), vec![fields.values()]);
        if !self.commit() {
            return Err(RepoError::CommitFailed { table: T::TABLE });
        }
        debug!(
            target: self.config.log_target.as_str(),
            "event=get_or_create module=session status=created table={}",
            T::TABLE
        );

        self.get(&fields)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "row created in `{}` does not match its own fields",
                T::TABLE
            ))
        })
    }

    /// Stages one instance for insertion.
    pub fn add<T: Entity>(&mut self, instance: &T) {
        self.stage(
            T::TABLE,
            insert_sql(T::TABLE, T::COLUMNS),
            vec![instance.values()],
        );
    }

    /// Stages many fully populated instances as one prepared batch.
    pub fn bulk_insert<T: Entity>(&mut self, instances: &[T]) {
        if instances.is_empty() {
            return;
        }
        self.stage(
            T::TABLE,
            insert_sql(T::TABLE, T::COLUMNS),
            instances.iter().map(T::values).collect(),
        );
    }

    /// Stages partial updates addressed by primary key.
    ///
    /// Either every mapping is staged or none is.
    ///
    /// # Errors
    /// - `RepoError::MissingKey` when a mapping lacks a key column.
    /// - `RepoError::UnknownColumn` for columns `T` does not declare.
    pub fn bulk_update<T: Entity>(&mut self, mappings: &[Fields<T>]) -> RepoResult<()> {
        let mut staged = Vec::with_capacity(mappings.len());
        for fields in mappings {
            fields.validate()?;
            let mut key_values = Vec::with_capacity(T::KEY.len());
            for key in T::KEY {
                match fields.get(key) {
                    Some(value) => key_values.push(value.clone()),
                    None => {
                        return Err(RepoError::MissingKey {
                            table: T::TABLE,
                            column: *key,
                        })
                    }
                }
            }

            let changes = fields
                .entries()
                .iter()
                .filter(|(name, _)| !T::KEY.contains(name))
                .collect::<Vec<_>>();
            if changes.is_empty() {
                continue;
            }

            let set_clause = changes
                .iter()
                .map(|(name, _)| format!("{} = ?", quote_ident(name)))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {} SET {set_clause} WHERE {}",
                quote_ident(T::TABLE),
                key_predicate(T::KEY)
            );
            let mut row = changes
                .into_iter()
                .map(|(_, value)| value.clone())
                .collect::<Vec<_>>();
            row.extend(key_values);
            staged.push((sql, row));
        }

        for (sql, row) in staged {
            self.stage(T::TABLE, sql, vec![row]);
        }
        Ok(())
    }

    /// Stages a set-based update of every row matched by `query`.
    ///
    /// Expressions are evaluated by the backend, so `Column::plus` and
    /// friends see each row's current value.
    pub fn update<T: Entity>(
        &mut self,
        query: &Query<T>,
        assignments: &[Assignment<T>],
    ) -> RepoResult<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let mut sql = format!("UPDATE {} SET ", quote_ident(T::TABLE));
        let mut params = Vec::new();
        for (index, assignment) in assignments.iter().enumerate() {
            let column = assignment.column.name();
            if !T::COLUMNS.contains(&column) {
                return Err(RepoError::UnknownColumn {
                    table: T::TABLE,
                    column: column.to_string(),
                });
            }
            if index > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&quote_ident(column));
            sql.push_str(" = ");
            assignment.expr.render(&mut sql, &mut params);
        }
        query.render_where(&mut sql, &mut params);

        self.stage(T::TABLE, sql, vec![params]);
        Ok(())
    }

    /// Persists every staged write in one transaction.
    ///
    /// Returns `false` after logging the failure and rolling back; the
    /// staged writes are discarded either way.
    pub fn commit(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        let statements: usize = pending.iter().map(|write| write.rows.len()).sum();
        let started_at = Instant::now();
        info!(
            target: self.config.log_target.as_str(),
            "event=commit module=session status=start statements={statements}"
        );

        match self.flush(&pending) {
            Ok(changed) => {
                info!(
                    target: self.config.log_target.as_str(),
                    "event=commit module=session status=ok statements={statements} rows_changed={changed} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                error!(
                    target: self.config.log_target.as_str(),
                    "event=commit module=session status=error statements={statements} duration_ms={} error={err} detail={err:?}",
                    started_at.elapsed().as_millis()
                );
                self.finish_rollback(statements);
                false
            }
        }
    }

    /// Discards staged writes without touching the database.
    pub fn rollback(&mut self) -> usize {
        let discarded = self.pending_writes();
        self.pending.clear();
        self.finish_rollback(discarded);
        discarded
    }

    /// Drops the whole backing table of `T`. Irreversible; the next
    /// `connect` re-creates it empty.
    pub fn drop_table<T: Entity>(&mut self) -> RepoResult<()> {
        info!(
            target: self.config.log_target.as_str(),
            "event=drop_table module=session table={}",
            T::TABLE
        );
        let sql = format!("DROP TABLE IF EXISTS {};", quote_ident(T::TABLE));
        echo(&self.config, &sql, &[]);
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    /// Children of `parent` through `relation`, fetched now.
    pub fn related<P: Entity, C: Entity>(
        &self,
        relation: &Relation<P, C>,
        parent: &P,
    ) -> RepoResult<Vec<C>> {
        match parent.value_of(relation.parent_key.name()) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(key) => Query::new().filter(relation.child_column.eq(key)).all(self),
        }
    }

    /// Parent of `child` through `relation`, `None` when unset or missing.
    pub fn parent<P: Entity, C: Entity>(
        &self,
        relation: &Relation<P, C>,
        child: &C,
    ) -> RepoResult<Option<P>> {
        match child.value_of(relation.child_column.name()) {
            None | Some(Value::Null) => Ok(None),
            Some(key) => Query::new().filter(relation.parent_key.eq(key)).first(self),
        }
    }

    /// Runs `query` and attaches children according to the relation's
    /// load strategy: eager relations are batch-loaded with one `IN` query,
    /// on-demand relations are left unloaded.
    pub fn load<P: Entity, C: Entity>(
        &self,
        query: &Query<P>,
        relation: &Relation<P, C>,
    ) -> RepoResult<Vec<Loaded<P, C>>> {
        let parents = query.all(self)?;
        if relation.strategy == LoadStrategy::OnDemand {
            return Ok(parents
                .into_iter()
                .map(|parent| Loaded {
                    parent,
                    children: None,
                })
                .collect());
        }

        let parent_keys = parents
            .iter()
            .map(|parent| parent.value_of(relation.parent_key.name()))
            .collect::<Vec<_>>();
        let lookup = parent_keys
            .iter()
            .flatten()
            .filter(|key| **key != Value::Null)
            .cloned()
            .collect::<Vec<_>>();
        let children = if lookup.is_empty() {
            Vec::new()
        } else {
            Query::new()
                .filter(relation.child_column.is_in(lookup))
                .all(self)?
        };

        let mut loaded = parents
            .into_iter()
            .map(|parent| Loaded {
                parent,
                children: Some(Vec::new()),
            })
            .collect::<Vec<_>>();
        for child in children {
            let foreign_key = child.value_of(relation.child_column.name());
            let slot = parent_keys
                .iter()
                .position(|key| key.is_some() && *key == foreign_key);
            // Unmatched children belong to parents outside the query.
            if let Some(index) = slot {
                loaded[index].children.get_or_insert_with(Vec::new).push(child);
            }
        }
        Ok(loaded)
    }

    pub(crate) fn fetch<T: Entity>(&self, query: &Query<T>) -> RepoResult<Vec<T>> {
        let (sql, params) = query.select_sql();
        echo(&self.config, &sql, &params);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(T::from_row(row)?);
        }
        Ok(entities)
    }

    pub(crate) fn count<T: Entity>(&self, query: &Query<T>) -> RepoResult<u64> {
        let (select, params) = query.select_sql();
        let sql = format!("SELECT COUNT(*) FROM ({select})");
        echo(&self.config, &sql, &params);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn stage(&mut self, table: &'static str, sql: String, rows: Vec<Vec<Value>>) {
        debug!(
            target: self.config.log_target.as_str(),
            "event=stage module=session table={table} rows={}",
            rows.len()
        );
        match self.pending.last_mut() {
            Some(last) if last.sql == sql => last.rows.extend(rows),
            _ => self.pending.push(PendingWrite { table, sql, rows }),
        }
    }

    fn flush(&mut self, pending: &[PendingWrite]) -> RepoResult<usize> {
        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for write in pending {
            let mut stmt = tx.prepare_cached(&write.sql)?;
            for row in &write.rows {
                echo(&self.config, &write.sql, row);
                changed += stmt.execute(params_from_iter(row.iter())).map_err(|err| {
                    debug!(
                        target: self.config.log_target.as_str(),
                        "event=write module=session status=error table={}",
                        write.table
                    );
                    RepoError::from(err)
                })?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    fn finish_rollback(&mut self, discarded: usize) {
        if !self.conn.is_autocommit() {
            if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
                error!(
                    target: self.config.log_target.as_str(),
                    "event=rollback module=session status=error error={err}"
                );
                return;
            }
        }
        warn!(
            target: self.config.log_target.as_str(),
            "event=rollback module=session status=ok discarded={discarded}"
        );
    }
}

fn match_fields<T>(fields: &Fields<T>) -> Condition<T> {
    Condition::and(
        fields
            .entries()
            .iter()
            .map(|(name, value)| Column::new(*name).eq(value.clone())),
    )
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
    }
    let names = columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        quote_ident(table)
    )
}

fn key_predicate(key: &[&str]) -> String {
    key.iter()
        .map(|column| format!("{} = ?", quote_ident(column)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn echo(config: &SessionConfig, sql: &str, params: &[Value]) {
    if config.echo {
        info!(
            target: config.log_target.as_str(),
            "event=sql module=session sql={sql} params={params:?}"
        );
    }
}
