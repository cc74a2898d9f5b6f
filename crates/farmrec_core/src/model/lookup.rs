//! Lookup tables managed from the utilities screens.
//!
//! Lookup rows carry no business rules beyond a unique label per table.

use crate::model::record::RecordId;
use serde::Serialize;

/// Which lookup table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Gender,
    CrabType,
}

impl LookupKind {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Gender => "genders",
            Self::CrabType => "crab_types",
        }
    }

    /// Label column, also the form field name.
    pub fn label_field(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::CrabType => "crab_type",
        }
    }

    /// Entity name used in messages.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::CrabType => "crab type",
        }
    }
}

/// One lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub id: RecordId,
    pub kind: LookupKind,
    pub label: String,
    pub created_at: i64,
    pub updated_at: i64,
}
