//! Crab domain model.
//!
//! # Invariants
//! - `id` and `tag_id` never change after creation.
//! - `removal_reason` is set exactly when `status == Removed`.

use crate::model::enums::{AgeUnit, CrabRemovalReason, Gender, HealthStatus, Species};
use crate::model::record::{RecordId, RecordStatus, Timestamps};
use serde::Serialize;

/// Persisted crab record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crab {
    pub id: RecordId,
    /// `CRB-YYYY-MM-DD-####`, assigned on creation.
    pub tag_id: String,
    pub species: Species,
    pub age_value: u32,
    pub age_unit: AgeUnit,
    /// Kilograms, non-negative.
    pub weight: f64,
    pub gender: Gender,
    pub health_status: HealthStatus,
    pub pond_id: Option<RecordId>,
    pub removal_reason: Option<CrabRemovalReason>,
    pub status: RecordStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Crab {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// Applies validated changes. Identity fields are not part of `changes`.
    pub fn apply(&mut self, changes: &CrabChanges) {
        if let Some(species) = changes.species {
            self.species = species;
        }
        if let Some(age_value) = changes.age_value {
            self.age_value = age_value;
        }
        if let Some(age_unit) = changes.age_unit {
            self.age_unit = age_unit;
        }
        if let Some(weight) = changes.weight {
            self.weight = weight;
        }
        if let Some(gender) = changes.gender {
            self.gender = gender;
        }
        if let Some(health_status) = changes.health_status {
            self.health_status = health_status;
        }
        if let Some(pond_id) = changes.pond_id {
            self.pond_id = Some(pond_id);
        }
    }
}

/// Crab read model with the tag id of its active pond, used as the pond label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrabRecord {
    #[serde(flatten)]
    pub crab: Crab,
    pub pond_tag_id: Option<String>,
}

/// Validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrab {
    pub species: Species,
    pub age_value: u32,
    pub age_unit: AgeUnit,
    pub weight: f64,
    pub gender: Gender,
    pub health_status: HealthStatus,
    pub pond_id: RecordId,
}

/// Validated update request; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrabChanges {
    pub species: Option<Species>,
    pub age_value: Option<u32>,
    pub age_unit: Option<AgeUnit>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
    pub health_status: Option<HealthStatus>,
    pub pond_id: Option<RecordId>,
}
