//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections, directly or from a URL.
//! - Configure connection pragmas required by the access layer.
//! - Ensure the schema exists before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have every pricing table present.

use super::migrations::apply_migrations;
use super::url::DatabaseUrl;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the backend named by a connection URL.
///
/// # Errors
/// - `DbError::UnsupportedBackend` for non-sqlite schemes.
/// - `DbError::InvalidUrl` for malformed URLs.
pub fn open_url(url: &str) -> DbResult<Connection> {
    let parsed = match DatabaseUrl::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("event=db_open module=db status=error error_code=db_url_rejected error={err}");
            return Err(err);
        }
    };
    info!(
        "event=db_url module=db status=ok mode={}",
        parsed.mode()
    );
    match parsed {
        DatabaseUrl::File(path) => open_db(path),
        DatabaseUrl::Memory => open_db_in_memory(),
    }
}

/// Opens a SQLite database file, creating it and its tables when missing.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory SQLite database with the full schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
