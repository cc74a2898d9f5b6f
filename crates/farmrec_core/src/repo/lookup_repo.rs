//! Lookup table repository (genders, crab types).
//!
//! Lookup rows are hard-deleted; there is no removal state.

use crate::db::now_epoch_ms;
use crate::model::lookup::{LookupEntry, LookupKind};
use crate::model::record::RecordId;
use crate::repo::{
    ensure_connection_ready, is_unique_violation, parse_uuid, RepoError, RepoResult,
    RequiredTable,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const REQUIRED_TABLES: &[RequiredTable] = &[
    RequiredTable {
        name: "genders",
        columns: &["id", "gender", "created_at", "updated_at"],
    },
    RequiredTable {
        name: "crab_types",
        columns: &["id", "crab_type", "created_at", "updated_at"],
    },
];

pub trait LookupRepository {
    fn create_entry(&self, kind: LookupKind, label: &str) -> RepoResult<LookupEntry>;
    fn update_entry(&self, kind: LookupKind, id: RecordId, label: &str) -> RepoResult<()>;
    fn get_entry(&self, kind: LookupKind, id: RecordId) -> RepoResult<Option<LookupEntry>>;
    /// Every row of `kind`, ordered by label.
    fn list_entries(&self, kind: LookupKind) -> RepoResult<Vec<LookupEntry>>;
    fn delete_entry(&self, kind: LookupKind, id: RecordId) -> RepoResult<()>;
    /// Whether another row of `kind` already uses `label`.
    fn label_exists(
        &self,
        kind: LookupKind,
        label: &str,
        except: Option<RecordId>,
    ) -> RepoResult<bool>;
}

pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLookupRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl LookupRepository for SqliteLookupRepository<'_> {
    fn create_entry(&self, kind: LookupKind, label: &str) -> RepoResult<LookupEntry> {
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO {} (id, {}, created_at, updated_at) VALUES (?1, ?2, ?3, ?3);",
            kind.table(),
            kind.label_field()
        );
        self.conn
            .execute(&sql, params![id.to_string(), label, now_epoch_ms()])
            .map_err(|err| label_error(err, kind, label))?;

        self.get_entry(kind, id)?.ok_or(RepoError::NotFound {
            entity: kind.entity(),
            id,
        })
    }

    fn update_entry(&self, kind: LookupKind, id: RecordId, label: &str) -> RepoResult<()> {
        let sql = format!(
            "UPDATE {} SET {} = ?2, updated_at = ?3 WHERE id = ?1;",
            kind.table(),
            kind.label_field()
        );
        let changed = self
            .conn
            .execute(&sql, params![id.to_string(), label, now_epoch_ms()])
            .map_err(|err| label_error(err, kind, label))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.entity(),
                id,
            });
        }
        Ok(())
    }

    fn get_entry(&self, kind: LookupKind, id: RecordId) -> RepoResult<Option<LookupEntry>> {
        let mut stmt = self.conn.prepare(&select_sql(kind, "WHERE id = ?1"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row, kind)?));
        }
        Ok(None)
    }

    fn list_entries(&self, kind: LookupKind) -> RepoResult<Vec<LookupEntry>> {
        let mut stmt = self
            .conn
            .prepare(&select_sql(kind, "ORDER BY label ASC, created_at ASC"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row, kind)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, kind: LookupKind, id: RecordId) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", kind.table());
        let changed = self.conn.execute(&sql, [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.entity(),
                id,
            });
        }
        Ok(())
    }

    fn label_exists(
        &self,
        kind: LookupKind,
        label: &str,
        except: Option<RecordId>,
    ) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(
                SELECT 1 FROM {} WHERE {} = ?1 AND (?2 IS NULL OR id <> ?2)
            );",
            kind.table(),
            kind.label_field()
        );
        let exists: bool = self.conn.query_row(
            &sql,
            params![label, except.map(|id| id.to_string())],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

fn select_sql(kind: LookupKind, tail: &str) -> String {
    format!(
        "SELECT id, {} AS label, created_at, updated_at FROM {} {tail};",
        kind.label_field(),
        kind.table()
    )
}

fn parse_entry_row(row: &Row<'_>, kind: LookupKind) -> RepoResult<LookupEntry> {
    let id_text: String = row.get("id")?;
    Ok(LookupEntry {
        id: parse_uuid(&id_text, kind.table())?,
        kind,
        label: row.get("label")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn label_error(err: rusqlite::Error, kind: LookupKind, label: &str) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::LabelTaken {
            kind,
            label: label.to_string(),
        };
    }
    RepoError::from(err)
}
