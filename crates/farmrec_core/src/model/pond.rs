//! Pond domain model.
//!
//! # Invariants
//! - `id` and `tag_id` never change after creation.
//! - `current_ph` stays within `[0, 14]` when set.

use crate::model::enums::{PondLocation, PondRemovalReason, WaterType};
use crate::model::record::{RecordId, RecordStatus, Timestamps};
use chrono::NaiveDate;
use serde::Serialize;

/// Persisted pond record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pond {
    pub id: RecordId,
    /// `PND-YYYY-MM-DD-####`, assigned on creation.
    pub tag_id: String,
    pub location: PondLocation,
    /// Square meters.
    pub size: f64,
    pub water_type: WaterType,
    pub setup_date: NaiveDate,
    pub current_ph: Option<f64>,
    pub current_temperature: Option<f64>,
    pub current_oxygen: Option<f64>,
    pub crab_population: Option<u32>,
    pub water_quality_log: Option<String>,
    pub maintenance_notes: Option<String>,
    pub removal_reason: Option<PondRemovalReason>,
    pub status: RecordStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Pond {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// Applies validated changes. Identity fields are not part of `changes`.
    pub fn apply(&mut self, changes: &PondChanges) {
        if let Some(location) = changes.location {
            self.location = location;
        }
        if let Some(size) = changes.size {
            self.size = size;
        }
        if let Some(water_type) = changes.water_type {
            self.water_type = water_type;
        }
        if let Some(setup_date) = changes.setup_date {
            self.setup_date = setup_date;
        }
        if let Some(current_ph) = changes.current_ph {
            self.current_ph = current_ph;
        }
        if let Some(current_temperature) = changes.current_temperature {
            self.current_temperature = current_temperature;
        }
        if let Some(current_oxygen) = changes.current_oxygen {
            self.current_oxygen = current_oxygen;
        }
        if let Some(crab_population) = changes.crab_population {
            self.crab_population = crab_population;
        }
        if let Some(water_quality_log) = &changes.water_quality_log {
            self.water_quality_log = water_quality_log.clone();
        }
        if let Some(maintenance_notes) = &changes.maintenance_notes {
            self.maintenance_notes = maintenance_notes.clone();
        }
    }
}

/// Validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPond {
    pub location: PondLocation,
    pub size: f64,
    pub water_type: WaterType,
    pub setup_date: NaiveDate,
    pub current_ph: Option<f64>,
    pub current_temperature: Option<f64>,
    pub current_oxygen: Option<f64>,
    pub crab_population: Option<u32>,
    pub water_quality_log: Option<String>,
    pub maintenance_notes: Option<String>,
}

/// Validated update request.
///
/// Outer `None` keeps the stored value; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PondChanges {
    pub location: Option<PondLocation>,
    pub size: Option<f64>,
    pub water_type: Option<WaterType>,
    pub setup_date: Option<NaiveDate>,
    pub current_ph: Option<Option<f64>>,
    pub current_temperature: Option<Option<f64>>,
    pub current_oxygen: Option<Option<f64>>,
    pub crab_population: Option<Option<u32>>,
    pub water_quality_log: Option<Option<String>>,
    pub maintenance_notes: Option<Option<String>>,
}
