//! Request validators for crab, pond, removal and lookup forms.

use super::validator::{Presence, Validator};
use super::{FormInput, ValidationErrors};
use crate::model::crab::{CrabChanges, NewCrab};
use crate::model::enums::{AgeUnit, FieldEnum, Gender, HealthStatus, PondLocation, Species, WaterType};
use crate::model::lookup::LookupKind;
use crate::model::pond::{NewPond, PondChanges};

/// Field carrying the reason on removal forms.
pub const REMOVAL_REASON_FIELD: &str = "removal_reason";

const NOTES_MAX_CHARS: usize = 2000;
const LABEL_MAX_CHARS: usize = 255;
const PH_MAX: f64 = 14.0;

/// Validates a crab create form. Every field is required.
///
/// `pond_id` is checked for shape only; the service checks it exists.
pub fn validate_new_crab(input: &FormInput) -> Result<NewCrab, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Required);
    let species = v.enumeration::<Species>("species");
    let age_value = v.non_negative_integer("age_value");
    let age_unit = v.enumeration::<AgeUnit>("age_unit");
    let weight = v.non_negative_number("weight");
    let gender = v.enumeration::<Gender>("gender");
    let health_status = v.enumeration::<HealthStatus>("health_status");
    let pond_id = v.reference("pond_id");
    let errors = v.into_errors();

    match (
        species,
        age_value,
        age_unit,
        weight,
        gender,
        health_status,
        pond_id,
    ) {
        (
            Some(species),
            Some(age_value),
            Some(age_unit),
            Some(weight),
            Some(gender),
            Some(health_status),
            Some(pond_id),
        ) if errors.is_empty() => Ok(NewCrab {
            species,
            age_value,
            age_unit,
            weight,
            gender,
            health_status,
            pond_id,
        }),
        _ => Err(errors),
    }
}

/// Validates a crab update form. Submitted fields must be valid and non-blank.
pub fn validate_crab_changes(input: &FormInput) -> Result<CrabChanges, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Sometimes);
    let changes = CrabChanges {
        species: v.enumeration::<Species>("species"),
        age_value: v.non_negative_integer("age_value"),
        age_unit: v.enumeration::<AgeUnit>("age_unit"),
        weight: v.non_negative_number("weight"),
        gender: v.enumeration::<Gender>("gender"),
        health_status: v.enumeration::<HealthStatus>("health_status"),
        pond_id: v.reference("pond_id"),
    };
    let errors = v.into_errors();
    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

/// Validates a pond create form.
pub fn validate_new_pond(input: &FormInput) -> Result<NewPond, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Required);
    let location = v.enumeration::<PondLocation>("location");
    let size = v.non_negative_number("size");
    let water_type = v.enumeration::<WaterType>("water_type");
    let setup_date = v.date("setup_date");
    let current_ph = v.nullable_number("current_ph", Some(PH_MAX));
    let current_temperature = v.nullable_number("current_temperature", None);
    let current_oxygen = v.nullable_number("current_oxygen", None);
    let crab_population = v.nullable_integer("crab_population");
    let water_quality_log = v.nullable_text("water_quality_log", NOTES_MAX_CHARS);
    let maintenance_notes = v.nullable_text("maintenance_notes", NOTES_MAX_CHARS);
    let errors = v.into_errors();

    match (location, size, water_type, setup_date) {
        (Some(location), Some(size), Some(water_type), Some(setup_date)) if errors.is_empty() => {
            Ok(NewPond {
                location,
                size,
                water_type,
                setup_date,
                current_ph: current_ph.flatten(),
                current_temperature: current_temperature.flatten(),
                current_oxygen: current_oxygen.flatten(),
                crab_population: crab_population.flatten(),
                water_quality_log: water_quality_log.flatten(),
                maintenance_notes: maintenance_notes.flatten(),
            })
        }
        _ => Err(errors),
    }
}

/// Validates a pond update form. Blank nullable fields clear stored values.
pub fn validate_pond_changes(input: &FormInput) -> Result<PondChanges, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Sometimes);
    let changes = PondChanges {
        location: v.enumeration::<PondLocation>("location"),
        size: v.non_negative_number("size"),
        water_type: v.enumeration::<WaterType>("water_type"),
        setup_date: v.date("setup_date"),
        current_ph: v.nullable_number("current_ph", Some(PH_MAX)),
        current_temperature: v.nullable_number("current_temperature", None),
        current_oxygen: v.nullable_number("current_oxygen", None),
        crab_population: v.nullable_integer("crab_population"),
        water_quality_log: v.nullable_text("water_quality_log", NOTES_MAX_CHARS),
        maintenance_notes: v.nullable_text("maintenance_notes", NOTES_MAX_CHARS),
    };
    let errors = v.into_errors();
    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

/// Validates a removal form against the entity's reason set.
pub fn validate_removal<R: FieldEnum>(input: &FormInput) -> Result<R, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Required);
    let reason = v.enumeration::<R>(REMOVAL_REASON_FIELD);
    let errors = v.into_errors();
    match reason {
        Some(reason) if errors.is_empty() => Ok(reason),
        _ => Err(errors),
    }
}

/// Validates the label of a lookup row. Uniqueness is checked by the service.
pub fn validate_lookup_label(
    input: &FormInput,
    kind: LookupKind,
) -> Result<String, ValidationErrors> {
    let mut v = Validator::new(input, Presence::Required);
    let label = v.text(kind.label_field(), LABEL_MAX_CHARS);
    let errors = v.into_errors();
    match label {
        Some(label) if errors.is_empty() => Ok(label),
        _ => Err(errors),
    }
}
