//! Crab repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist crab records and project them with their pond label.
//! - Assign tag ids atomically with the insert.
//!
//! # Invariants
//! - Active listings are ordered newest first (`created_at DESC`, then
//!   insertion order).
//! - Updates never write `id` or `tag_id`.
//! - Removal sets reason, status and `deleted_at` in one statement and only
//!   applies to active rows.

use crate::db::now_epoch_ms;
use crate::model::crab::{Crab, CrabRecord, NewCrab};
use crate::model::enums::{CrabRemovalReason, FieldEnum};
use crate::model::record::{RecordId, RecordStatus, Timestamps};
use crate::model::tag_id::TagPrefix;
use crate::repo::tag_sequence::{latest_tag_id, reserve_tag_id};
use crate::repo::{
    ensure_connection_ready, parse_enum, parse_status, parse_uuid, RepoError, RepoResult,
    RequiredTable,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const ENTITY: &str = "crab";

const CRAB_SELECT_SQL: &str = "SELECT
    c.id AS id,
    c.tag_id AS tag_id,
    c.species AS species,
    c.age_value AS age_value,
    c.age_unit AS age_unit,
    c.weight AS weight,
    c.gender AS gender,
    c.health_status AS health_status,
    c.pond_id AS pond_id,
    c.removal_reason AS removal_reason,
    c.status AS status,
    c.created_at AS created_at,
    c.updated_at AS updated_at,
    c.deleted_at AS deleted_at,
    p.tag_id AS pond_tag_id
FROM crabs c
LEFT JOIN ponds p ON p.id = c.pond_id AND p.status = 'active'";

const REQUIRED_TABLES: &[RequiredTable] = &[
    RequiredTable {
        name: "crabs",
        columns: &[
            "id",
            "tag_id",
            "species",
            "age_value",
            "age_unit",
            "weight",
            "gender",
            "health_status",
            "pond_id",
            "removal_reason",
            "status",
            "created_at",
            "updated_at",
            "deleted_at",
        ],
    },
    RequiredTable {
        name: "ponds",
        columns: &["id", "tag_id", "status"],
    },
    RequiredTable {
        name: "tag_sequences",
        columns: &["prefix", "day", "last_value"],
    },
];

/// Repository interface for crab records.
pub trait CrabRepository {
    /// Inserts a crab with the next tag id of `day` and returns it.
    fn create_crab(&self, crab: &NewCrab, day: NaiveDate) -> RepoResult<CrabRecord>;
    /// Writes every mutable field of an active crab.
    fn update_crab(&self, crab: &Crab) -> RepoResult<()>;
    fn get_crab(&self, id: RecordId, include_removed: bool) -> RepoResult<Option<CrabRecord>>;
    /// All active crabs, newest first.
    fn list_active_crabs(&self) -> RepoResult<Vec<CrabRecord>>;
    fn remove_crab(&self, id: RecordId, reason: CrabRemovalReason) -> RepoResult<()>;
    /// Greatest crab tag id issued on `day`, removed crabs included.
    fn latest_tag_id(&self, day: NaiveDate) -> RepoResult<Option<String>>;
    /// Whether `id` names an active pond a crab may be assigned to.
    fn pond_is_active(&self, id: RecordId) -> RepoResult<bool>;
}

/// SQLite-backed crab repository.
pub struct SqliteCrabRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCrabRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl CrabRepository for SqliteCrabRepository<'_> {
    fn create_crab(&self, crab: &NewCrab, day: NaiveDate) -> RepoResult<CrabRecord> {
        let id = Uuid::new_v4();
        let now = now_epoch_ms();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tag_id = reserve_tag_id(&tx, TagPrefix::Crab, day)?;

        tx.execute(
            "INSERT INTO crabs (
                id,
                tag_id,
                species,
                age_value,
                age_unit,
                weight,
                gender,
                health_status,
                pond_id,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'active', ?10, ?10);",
            params![
                id.to_string(),
                tag_id,
                crab.species.as_str(),
                crab.age_value,
                crab.age_unit.as_str(),
                crab.weight,
                crab.gender.as_str(),
                crab.health_status.as_str(),
                crab.pond_id.to_string(),
                now,
            ],
        )?;
        tx.commit()?;

        self.get_crab(id, false)?
            .ok_or(RepoError::NotFound { entity: ENTITY, id })
    }

    fn update_crab(&self, crab: &Crab) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE crabs
             SET
                species = ?2,
                age_value = ?3,
                age_unit = ?4,
                weight = ?5,
                gender = ?6,
                health_status = ?7,
                pond_id = ?8,
                updated_at = ?9
             WHERE id = ?1
               AND status = 'active';",
            params![
                crab.id.to_string(),
                crab.species.as_str(),
                crab.age_value,
                crab.age_unit.as_str(),
                crab.weight,
                crab.gender.as_str(),
                crab.health_status.as_str(),
                crab.pond_id.map(|id| id.to_string()),
                now_epoch_ms(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: crab.id,
            });
        }
        Ok(())
    }

    fn get_crab(&self, id: RecordId, include_removed: bool) -> RepoResult<Option<CrabRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CRAB_SELECT_SQL}
             WHERE c.id = ?1
               AND (?2 = 1 OR c.status = 'active');"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), include_removed])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_crab_row(row)?));
        }
        Ok(None)
    }

    fn list_active_crabs(&self) -> RepoResult<Vec<CrabRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CRAB_SELECT_SQL}
             WHERE c.status = 'active'
             ORDER BY c.created_at DESC, c.rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut crabs = Vec::new();
        while let Some(row) = rows.next()? {
            crabs.push(parse_crab_row(row)?);
        }
        Ok(crabs)
    }

    fn remove_crab(&self, id: RecordId, reason: CrabRemovalReason) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE crabs
             SET
                removal_reason = ?2,
                status = 'removed',
                deleted_at = ?3,
                updated_at = ?3
             WHERE id = ?1
               AND status = 'active';",
            params![id.to_string(), reason.as_str(), now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn latest_tag_id(&self, day: NaiveDate) -> RepoResult<Option<String>> {
        latest_tag_id(self.conn, TagPrefix::Crab, day)
    }

    fn pond_is_active(&self, id: RecordId) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM ponds WHERE id = ?1 AND status = 'active'
            );",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

fn parse_crab_row(row: &Row<'_>) -> RepoResult<CrabRecord> {
    let id_text: String = row.get("id")?;
    let pond_id = match row.get::<_, Option<String>>("pond_id")? {
        Some(value) => Some(parse_uuid(&value, "crabs.pond_id")?),
        None => None,
    };
    let removal_reason = match row.get::<_, Option<String>>("removal_reason")? {
        Some(value) => Some(parse_enum::<CrabRemovalReason>(
            &value,
            "crabs.removal_reason",
        )?),
        None => None,
    };

    let crab = Crab {
        id: parse_uuid(&id_text, "crabs.id")?,
        tag_id: row.get("tag_id")?,
        species: parse_enum(&row.get::<_, String>("species")?, "crabs.species")?,
        age_value: row.get("age_value")?,
        age_unit: parse_enum(&row.get::<_, String>("age_unit")?, "crabs.age_unit")?,
        weight: row.get("weight")?,
        gender: parse_enum(&row.get::<_, String>("gender")?, "crabs.gender")?,
        health_status: parse_enum(
            &row.get::<_, String>("health_status")?,
            "crabs.health_status",
        )?,
        pond_id,
        removal_reason,
        status: parse_status(&row.get::<_, String>("status")?, "crabs.status")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    };

    if (crab.status == RecordStatus::Removed) != crab.removal_reason.is_some() {
        return Err(RepoError::InvalidData(format!(
            "crab {} has status `{}` but removal_reason {:?}",
            crab.id,
            crab.status.as_db(),
            crab.removal_reason
        )));
    }

    Ok(CrabRecord {
        crab,
        pond_tag_id: row.get("pond_tag_id")?,
    })
}
