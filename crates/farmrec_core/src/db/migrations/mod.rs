//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register the farm record schema in strictly increasing steps.
//! - Apply every pending step inside one transaction.
//!
//! # Invariants
//! - `version` values are contiguous, starting at 1.
//! - `PRAGMA user_version` always equals the last applied step.
//! - A database newer than this binary is never touched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "lookups",
        sql: include_str!("0002_lookups.sql"),
    },
    Migration {
        version: 3,
        name: "tag_sequences",
        sql: include_str!("0003_tag_sequences.sql"),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations and returns the versions that ran.
///
/// The version is read under the write lock so concurrent openers of a fresh
/// file apply each step once.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let tx = Transaction::new(conn, TransactionBehavior::Immediate)?;
    let current = schema_version(&tx)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    for migration in &pending {
        tx.execute_batch(migration.sql)
            .map_err(|source| DbError::MigrationFailed {
                version: migration.version,
                source,
            })?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(pending.iter().map(|migration| migration.version).collect())
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
