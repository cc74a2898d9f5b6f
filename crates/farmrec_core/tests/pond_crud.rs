use chrono::NaiveDate;
use farmrec_core::db::open_db_in_memory;
use farmrec_core::model::enums::{PondLocation, PondRemovalReason, WaterType};
use farmrec_core::service::clock::FixedClock;
use farmrec_core::{
    FormInput, PondService, RecordStatus, ServiceError, SqlitePondRepository, ValidationErrors,
};
use rusqlite::Connection;

fn pond_service(conn: &Connection) -> PondService<SqlitePondRepository<'_>, FixedClock> {
    PondService::with_clock(
        SqlitePondRepository::try_new(conn).unwrap(),
        FixedClock(NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()),
    )
}

fn pond_form() -> FormInput {
    FormInput::new()
        .with("location", "Inland Brackish Pond Zone")
        .with("size", "250.5")
        .with("water_type", "Brackish")
        .with("setup_date", "2024-11-02")
        .with("current_ph", "7.8")
        .with("current_temperature", "28")
        .with("current_oxygen", "")
        .with("crab_population", "40")
        .with("maintenance_notes", "Nets replaced")
}

fn validation_errors(err: ServiceError) -> ValidationErrors {
    match err {
        ServiceError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn store_parses_every_field() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);

    let pond = service.store(&pond_form()).unwrap();
    assert_eq!(pond.tag_id, "PND-2025-04-08-0001");
    assert_eq!(pond.location, PondLocation::InlandBrackish);
    assert_eq!(pond.size, 250.5);
    assert_eq!(pond.water_type, WaterType::Brackish);
    assert_eq!(pond.setup_date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
    assert_eq!(pond.current_ph, Some(7.8));
    assert_eq!(pond.current_oxygen, None);
    assert_eq!(pond.crab_population, Some(40));
    assert_eq!(pond.water_quality_log, None);
    assert_eq!(pond.maintenance_notes.as_deref(), Some("Nets replaced"));
}

#[test]
fn store_rejects_out_of_range_readings() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);

    let err = service
        .store(
            &pond_form()
                .with("current_ph", "15")
                .with("setup_date", "2024-02-30")
                .with("water_quality_log", "x".repeat(2001)),
        )
        .unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(
        errors.field_names(),
        vec!["current_ph", "setup_date", "water_quality_log"]
    );
    assert_eq!(
        errors.get("water_quality_log").unwrap(),
        &["The water quality log field must not be greater than 2000 characters.".to_string()]
    );
    assert!(service.list_active().unwrap().is_empty());
}

#[test]
fn update_blank_nullable_field_clears_it() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);
    let created = service.store(&pond_form()).unwrap();

    let updated = service
        .update(
            created.id,
            &FormInput::new()
                .with("current_ph", "")
                .with("size", "300"),
        )
        .unwrap();
    assert_eq!(updated.current_ph, None);
    assert_eq!(updated.size, 300.0);
    assert_eq!(updated.current_temperature, Some(28.0));
    assert_eq!(updated.tag_id, created.tag_id);
}

#[test]
fn update_blank_required_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);
    let created = service.store(&pond_form()).unwrap();

    let err = service
        .update(created.id, &FormInput::new().with("location", " "))
        .unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(
        errors.get("location").unwrap(),
        &["The location field is required.".to_string()]
    );
    assert_eq!(
        service.get(created.id).unwrap().location,
        PondLocation::InlandBrackish
    );
}

#[test]
fn destroy_records_reason_and_hides_pond() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);
    let created = service.store(&pond_form()).unwrap();

    let removed = service
        .destroy(
            created.id,
            &FormInput::new().with("removal_reason", "Decommissioned"),
        )
        .unwrap();
    assert_eq!(removed.status, RecordStatus::Removed);
    assert_eq!(
        removed.removal_reason,
        Some(PondRemovalReason::Decommissioned)
    );
    assert!(service.list_active().unwrap().is_empty());
    assert!(matches!(
        service.get(created.id),
        Err(ServiceError::NotFound { entity: "pond", .. })
    ));
}

#[test]
fn destroy_rejects_crab_reason() {
    let conn = open_db_in_memory().unwrap();
    let service = pond_service(&conn);
    let created = service.store(&pond_form()).unwrap();

    let errors = validation_errors(
        service
            .destroy(created.id, &FormInput::new().with("removal_reason", "Sold"))
            .unwrap_err(),
    );
    assert_eq!(
        errors.get("removal_reason").unwrap(),
        &["The selected removal reason is invalid.".to_string()]
    );
}
