//! Lifecycle state shared by crab and pond records.
//!
//! # Invariants
//! - `status` is the source of truth for visibility; `deleted_at` only records
//!   when the removal happened.
//! - Removed records keep their tag id reserved.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of crab, pond and lookup rows.
pub type RecordId = Uuid;

/// Visibility state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Listed and editable.
    Active,
    /// Taken out of service with a removal reason.
    Removed,
}

impl RecordStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// Creation/update/removal timestamps in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}
