//! Domain model for farm records.
//!
//! # Responsibility
//! - Define crab, pond and lookup records plus their validated requests.
//! - Own the shared enumerations and the tag id format.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Removal is a status change, never a hard delete (lookups excepted).

pub mod crab;
pub mod enums;
pub mod lookup;
pub mod pond;
pub mod record;
pub mod tag_id;
