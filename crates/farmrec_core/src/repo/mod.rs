//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per record type.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Every read of crabs/ponds filters on `status` unless removed rows are
//!   explicitly requested.
//! - Repositories refuse connections whose schema is not fully migrated.
//! - Stored enum values that no longer parse surface as `InvalidData`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::enums::FieldEnum;
use crate::model::lookup::LookupKind;
use crate::model::record::{RecordId, RecordStatus};
use crate::model::tag_id::TagIdError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod crab_repo;
pub mod lookup_repo;
pub mod pond_repo;
pub mod tag_sequence;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by crab, pond and lookup persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target row does not exist or is removed.
    NotFound { entity: &'static str, id: RecordId },
    /// Tag id could not be derived for a new record.
    TagId(TagIdError),
    /// Lookup label collides with an existing row.
    LabelTaken { kind: LookupKind, label: String },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::TagId(err) => write!(f, "{err}"),
            Self::LabelTaken { kind, label } => {
                write!(f, "{} `{label}` already exists", kind.entity())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::TagId(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TagIdError> for RepoError {
    fn from(value: TagIdError) -> Self {
        Self::TagId(value)
    }
}

/// Table/column shape a repository depends on.
pub(crate) struct RequiredTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Verifies schema version and the tables/columns a repository reads.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[RequiredTable],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        let columns = table_columns(conn, table.name)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        if let Some(&column) = table
            .columns
            .iter()
            .find(|column| !columns.iter().any(|existing| existing == *column))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: table.name,
                column,
            });
        }
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_enum<E: FieldEnum>(value: &str, column: &str) -> RepoResult<E> {
    E::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

pub(crate) fn parse_status(value: &str, column: &str) -> RepoResult<RecordStatus> {
    RecordStatus::from_db(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in {column}")))
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
