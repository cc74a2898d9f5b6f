use farmrec_core::db::migrations::latest_version;
use farmrec_core::db::{open_db, open_db_in_memory, DbError};
use farmrec_core::{RepoError, SqliteCrabRepository, SqliteLookupRepository, SqlitePondRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "ponds");
    assert_table_exists(&conn, "crabs");
    assert_table_exists(&conn, "genders");
    assert_table_exists(&conn, "crab_types");
    assert_table_exists(&conn, "tag_sequences");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farmrec.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "crabs");
}

#[test]
fn concurrent_first_opens_migrate_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farmrec.sqlite3");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            std::thread::spawn(move || open_db(&path).map(|conn| schema_version(&conn)))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), latest_version());
    }

    let conn = open_db(&path).unwrap();
    assert_table_exists(&conn, "tag_sequences");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteCrabRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
    assert!(SqlitePondRepository::try_new(&conn).is_err());
    assert!(SqliteLookupRepository::try_new(&conn).is_err());
}

#[test]
fn repositories_reject_missing_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE ponds (id TEXT PRIMARY KEY, tag_id TEXT, status TEXT);
         CREATE TABLE crabs (id TEXT PRIMARY KEY, tag_id TEXT);
         CREATE TABLE tag_sequences (prefix TEXT, day TEXT, last_value INTEGER);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    match SqliteCrabRepository::try_new(&conn) {
        Err(RepoError::MissingRequiredColumn { table, column }) => {
            assert_eq!(table, "crabs");
            assert_eq!(column, "species");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("repository accepted an incomplete schema"),
    }
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
