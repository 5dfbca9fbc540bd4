use pricing_core::db::migrations::latest_version;
use pricing_core::db::{open_db, open_db_in_memory, open_url, DatabaseUrl, DbError};
use rusqlite::Connection;
use std::path::PathBuf;

const TABLES: &[&str] = &[
    "chains",
    "web_access",
    "stores",
    "items",
    "store_products",
    "price_history",
    "current_price",
    "promotions",
    "promotion_items",
    "restrictions",
    "price_functions",
];

#[test]
fn open_db_in_memory_creates_every_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO chains (full_id, subchain_id, name) VALUES (1, 0, 'Acme')", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let chains: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM chains", [], |row| row.get(0))
        .unwrap();
    assert_eq!(chains, 1);
}

#[test]
fn reopening_recreates_dropped_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP TABLE price_functions;").unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_table_exists(&conn, "price_functions");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute("INSERT INTO stores (store_id, chain_id) VALUES (1, 42)", [])
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"), "{err}");
}

#[test]
fn url_forms_resolve_to_backends() {
    assert_eq!(DatabaseUrl::parse("sqlite://").unwrap(), DatabaseUrl::Memory);
    assert_eq!(
        DatabaseUrl::parse("sqlite:///:memory:").unwrap(),
        DatabaseUrl::Memory
    );
    assert_eq!(
        DatabaseUrl::parse("sqlite:///shopping.db").unwrap(),
        DatabaseUrl::File(PathBuf::from("shopping.db"))
    );
    assert_eq!(
        DatabaseUrl::parse("sqlite:////var/data/shopping.db").unwrap(),
        DatabaseUrl::File(PathBuf::from("/var/data/shopping.db"))
    );
}

#[test]
fn open_url_rejects_other_backends() {
    let err = open_url("postgresql://user:pw@localhost/shopping").unwrap_err();
    match err {
        DbError::UnsupportedBackend { scheme } => assert_eq!(scheme, "postgresql"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn driver_qualified_urls_name_the_sqlite_only_build() {
    let err = open_url("postgresql+psycopg2://user:pw@db.example.com/shopping").unwrap_err();
    assert!(matches!(&err, DbError::UnsupportedBackend { scheme } if scheme == "postgresql+psycopg2"));
    let message = err.to_string();
    assert!(message.contains("postgresql+psycopg2"), "{message}");
    assert!(message.contains("only supports sqlite"), "{message}");
}

#[test]
fn url_modes_describe_the_backend() {
    assert_eq!(DatabaseUrl::parse("sqlite://").unwrap().mode(), "memory");
    assert_eq!(DatabaseUrl::parse("shopping.db").unwrap().mode(), "file");
}

#[test]
fn open_url_opens_file_databases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("url.db");
    let url = format!("sqlite:///{}", path.display());

    let conn = open_url(&url).unwrap();
    assert_table_exists(&conn, "items");
    assert!(path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
