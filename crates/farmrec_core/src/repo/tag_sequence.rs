//! Storage side of the daily tag id sequence.
//!
//! # Responsibility
//! - Find the greatest tag id already issued for a prefix and day, removed
//!   records included.
//! - Reserve the next tag id by advancing the `(prefix, day)` counter row.
//!
//! # Invariants
//! - `reserve_tag_id` must run inside the IMMEDIATE transaction that inserts
//!   the record; SQLite's write lock then serializes concurrent creators.
//! - The issued sequence is `max(scan, counter) + 1`, so ids written before the
//!   counter existed, or by another writer, are never reissued.

use crate::model::tag_id::{day_key, day_pattern, next_tag_id, tag_after, TagId, TagPrefix};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

/// Table holding the records of `prefix`.
pub(crate) fn table_for(prefix: TagPrefix) -> &'static str {
    match prefix {
        TagPrefix::Crab => "crabs",
        TagPrefix::Pond => "ponds",
    }
}

/// Returns the greatest tag id issued on `day`, removed records included.
pub fn latest_tag_id(
    conn: &Connection,
    prefix: TagPrefix,
    day: NaiveDate,
) -> RepoResult<Option<String>> {
    let sql = format!(
        "SELECT tag_id
         FROM {}
         WHERE tag_id LIKE ?1
         ORDER BY tag_id DESC
         LIMIT 1;",
        table_for(prefix)
    );
    let latest = conn
        .query_row(&sql, [day_pattern(prefix, day)], |row| row.get(0))
        .optional()?;
    Ok(latest)
}

/// Computes the tag id the next creation on `day` would receive.
///
/// Read-only; the value is only guaranteed when computed by
/// [`reserve_tag_id`] inside the inserting transaction.
pub fn peek_tag_id(conn: &Connection, prefix: TagPrefix, day: NaiveDate) -> RepoResult<TagId> {
    let latest = latest_tag_id(conn, prefix, day)?;
    let from_scan = next_tag_id(prefix, day, latest.as_deref())?;
    let counter = read_counter(conn, prefix, day)?;
    if counter >= from_scan.sequence {
        return Ok(tag_after(prefix, day, counter)?);
    }
    Ok(from_scan)
}

/// Reserves the next tag id on `day` and records it in the counter row.
pub(crate) fn reserve_tag_id(
    conn: &Connection,
    prefix: TagPrefix,
    day: NaiveDate,
) -> RepoResult<String> {
    let tag = peek_tag_id(conn, prefix, day)?;
    conn.execute(
        "INSERT INTO tag_sequences (prefix, day, last_value)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (prefix, day) DO UPDATE SET last_value = excluded.last_value;",
        params![prefix.as_str(), day_key(day), tag.sequence],
    )?;
    Ok(tag.to_string())
}

fn read_counter(conn: &Connection, prefix: TagPrefix, day: NaiveDate) -> RepoResult<u32> {
    let value = conn
        .query_row(
            "SELECT last_value FROM tag_sequences WHERE prefix = ?1 AND day = ?2;",
            params![prefix.as_str(), day_key(day)],
            |row| row.get::<_, u32>(0),
        )
        .optional()?;
    Ok(value.unwrap_or(0))
}
