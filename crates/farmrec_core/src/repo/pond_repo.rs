//! Pond repository contract and SQLite implementation.
//!
//! # Invariants
//! - `setup_date` is stored as `YYYY-MM-DD` text.
//! - Removing a pond does not touch the crabs assigned to it; their pond
//!   label simply stops resolving.

use crate::db::now_epoch_ms;
use crate::model::enums::{FieldEnum, PondRemovalReason};
use crate::model::pond::{NewPond, Pond};
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

const ENTITY: &str = "pond";
const DATE_FORMAT: &str = "%Y-%m-%d";

const POND_SELECT_SQL: &str = "SELECT
    id,
    tag_id,
    location,
    size,
    water_type,
    setup_date,
    current_ph,
    current_temperature,
    current_oxygen,
    crab_population,
    water_quality_log,
    maintenance_notes,
    removal_reason,
    status,
    created_at,
    updated_at,
    deleted_at
FROM ponds";

const REQUIRED_TABLES: &[RequiredTable] = &[
    RequiredTable {
        name: "ponds",
        columns: &[
            "id",
            "tag_id",
            "location",
            "size",
            "water_type",
            "setup_date",
            "current_ph",
            "current_temperature",
            "current_oxygen",
            "crab_population",
            "water_quality_log",
            "maintenance_notes",
            "removal_reason",
            "status",
            "created_at",
            "updated_at",
            "deleted_at",
        ],
    },
    RequiredTable {
        name: "tag_sequences",
        columns: &["prefix", "day", "last_value"],
    },
];

/// Repository interface for pond records.
pub trait PondRepository {
    /// Inserts a pond with the next tag id of `day` and returns it.
    fn create_pond(&self, pond: &NewPond, day: NaiveDate) -> RepoResult<Pond>;
    fn update_pond(&self, pond: &Pond) -> RepoResult<()>;
    fn get_pond(&self, id: RecordId, include_removed: bool) -> RepoResult<Option<Pond>>;
    /// All active ponds, newest first.
    fn list_active_ponds(&self) -> RepoResult<Vec<Pond>>;
    fn remove_pond(&self, id: RecordId, reason: PondRemovalReason) -> RepoResult<()>;
    fn latest_tag_id(&self, day: NaiveDate) -> RepoResult<Option<String>>;
}

/// SQLite-backed pond repository.
pub struct SqlitePondRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePondRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl PondRepository for SqlitePondRepository<'_> {
    fn create_pond(&self, pond: &NewPond, day: NaiveDate) -> RepoResult<Pond> {
        let id = Uuid::new_v4();
        let now = now_epoch_ms();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tag_id = reserve_tag_id(&tx, TagPrefix::Pond, day)?;

        tx.execute(
            "INSERT INTO ponds (
                id,
                tag_id,
                location,
                size,
                water_type,
                setup_date,
                current_ph,
                current_temperature,
                current_oxygen,
                crab_population,
                water_quality_log,
                maintenance_notes,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 'active', ?13, ?13);",
            params![
                id.to_string(),
                tag_id,
                pond.location.as_str(),
                pond.size,
                pond.water_type.as_str(),
                pond.setup_date.format(DATE_FORMAT).to_string(),
                pond.current_ph,
                pond.current_temperature,
                pond.current_oxygen,
                pond.crab_population,
                pond.water_quality_log,
                pond.maintenance_notes,
                now,
            ],
        )?;
        tx.commit()?;

        self.get_pond(id, false)?
            .ok_or(RepoError::NotFound { entity: ENTITY, id })
    }

    fn update_pond(&self, pond: &Pond) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE ponds
             SET
                location = ?2,
                size = ?3,
                water_type = ?4,
                setup_date = ?5,
                current_ph = ?6,
                current_temperature = ?7,
                current_oxygen = ?8,
                crab_population = ?9,
                water_quality_log = ?10,
                maintenance_notes = ?11,
                updated_at = ?12
             WHERE id = ?1
               AND status = 'active';",
            params![
                pond.id.to_string(),
                pond.location.as_str(),
                pond.size,
                pond.water_type.as_str(),
                pond.setup_date.format(DATE_FORMAT).to_string(),
                pond.current_ph,
                pond.current_temperature,
                pond.current_oxygen,
                pond.crab_population,
                pond.water_quality_log,
                pond.maintenance_notes,
                now_epoch_ms(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: pond.id,
            });
        }
        Ok(())
    }

    fn get_pond(&self, id: RecordId, include_removed: bool) -> RepoResult<Option<Pond>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POND_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR status = 'active');"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), include_removed])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pond_row(row)?));
        }
        Ok(None)
    }

    fn list_active_ponds(&self) -> RepoResult<Vec<Pond>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POND_SELECT_SQL}
             WHERE status = 'active'
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut ponds = Vec::new();
        while let Some(row) = rows.next()? {
            ponds.push(parse_pond_row(row)?);
        }
        Ok(ponds)
    }

    fn remove_pond(&self, id: RecordId, reason: PondRemovalReason) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE ponds
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
        latest_tag_id(self.conn, TagPrefix::Pond, day)
    }
}

fn parse_pond_row(row: &Row<'_>) -> RepoResult<Pond> {
    let id_text: String = row.get("id")?;
    let setup_text: String = row.get("setup_date")?;
    let setup_date = NaiveDate::parse_from_str(&setup_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{setup_text}` in ponds.setup_date"))
    })?;
    let removal_reason = match row.get::<_, Option<String>>("removal_reason")? {
        Some(value) => Some(parse_enum::<PondRemovalReason>(
            &value,
            "ponds.removal_reason",
        )?),
        None => None,
    };

    let pond = Pond {
        id: parse_uuid(&id_text, "ponds.id")?,
        tag_id: row.get("tag_id")?,
        location: parse_enum(&row.get::<_, String>("location")?, "ponds.location")?,
        size: row.get("size")?,
        water_type: parse_enum(&row.get::<_, String>("water_type")?, "ponds.water_type")?,
        setup_date,
        current_ph: row.get("current_ph")?,
        current_temperature: row.get("current_temperature")?,
        current_oxygen: row.get("current_oxygen")?,
        crab_population: row.get("crab_population")?,
        water_quality_log: row.get("water_quality_log")?,
        maintenance_notes: row.get("maintenance_notes")?,
        removal_reason,
        status: parse_status(&row.get::<_, String>("status")?, "ponds.status")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    };

    if (pond.status == RecordStatus::Removed) != pond.removal_reason.is_some() {
        return Err(RepoError::InvalidData(format!(
            "pond {} has status `{}` but removal_reason {:?}",
            pond.id,
            pond.status.as_db(),
            pond.removal_reason
        )));
    }

    Ok(pond)
}
