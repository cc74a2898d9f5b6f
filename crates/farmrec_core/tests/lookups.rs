use farmrec_core::db::open_db_in_memory;
use farmrec_core::{
    FormInput, LookupKind, LookupRepository, LookupService, RepoError, ServiceError,
    SqliteLookupRepository,
};
use uuid::Uuid;

fn label(kind: LookupKind, value: &str) -> FormInput {
    FormInput::new().with(kind.label_field(), value)
}

#[test]
fn entries_are_listed_by_label_per_table() {
    let conn = open_db_in_memory().unwrap();
    let service = LookupService::new(SqliteLookupRepository::try_new(&conn).unwrap());

    for value in ["Male", "Female", "Berried Female"] {
        service
            .store(LookupKind::Gender, &label(LookupKind::Gender, value))
            .unwrap();
    }
    service
        .store(LookupKind::CrabType, &label(LookupKind::CrabType, "Male"))
        .unwrap();

    let genders: Vec<String> = service
        .list(LookupKind::Gender)
        .unwrap()
        .into_iter()
        .map(|entry| entry.label)
        .collect();
    assert_eq!(genders, vec!["Berried Female", "Female", "Male"]);
    assert_eq!(service.list(LookupKind::CrabType).unwrap().len(), 1);
}

#[test]
fn duplicate_label_is_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let service = LookupService::new(SqliteLookupRepository::try_new(&conn).unwrap());
    service
        .store(LookupKind::CrabType, &label(LookupKind::CrabType, "Mud"))
        .unwrap();

    match service.store(LookupKind::CrabType, &label(LookupKind::CrabType, "Mud")) {
        Err(ServiceError::Validation(errors)) => assert_eq!(
            errors.get("crab_type").unwrap(),
            &["The crab type has already been taken.".to_string()]
        ),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn update_may_keep_its_own_label() {
    let conn = open_db_in_memory().unwrap();
    let service = LookupService::new(SqliteLookupRepository::try_new(&conn).unwrap());
    let entry = service
        .store(LookupKind::Gender, &label(LookupKind::Gender, "Male"))
        .unwrap();
    service
        .store(LookupKind::Gender, &label(LookupKind::Gender, "Female"))
        .unwrap();

    let same = service
        .update(LookupKind::Gender, entry.id, &label(LookupKind::Gender, "Male"))
        .unwrap();
    assert_eq!(same.label, "Male");

    assert!(matches!(
        service.update(
            LookupKind::Gender,
            entry.id,
            &label(LookupKind::Gender, "Female")
        ),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn blank_and_overlong_labels_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = LookupService::new(SqliteLookupRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.store(LookupKind::Gender, &label(LookupKind::Gender, "  ")),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service.store(
            LookupKind::Gender,
            &label(LookupKind::Gender, &"g".repeat(256))
        ),
        Err(ServiceError::Validation(_))
    ));
    assert!(service.list(LookupKind::Gender).unwrap().is_empty());
}

#[test]
fn destroy_deletes_row() {
    let conn = open_db_in_memory().unwrap();
    let service = LookupService::new(SqliteLookupRepository::try_new(&conn).unwrap());
    let entry = service
        .store(LookupKind::CrabType, &label(LookupKind::CrabType, "Blue"))
        .unwrap();

    service.destroy(LookupKind::CrabType, entry.id).unwrap();
    assert!(matches!(
        service.get(LookupKind::CrabType, entry.id),
        Err(ServiceError::NotFound {
            entity: "crab type",
            ..
        })
    ));
    assert!(matches!(
        service.destroy(LookupKind::CrabType, Uuid::new_v4()),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn repository_maps_unique_violation_to_label_taken() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLookupRepository::try_new(&conn).unwrap();
    repo.create_entry(LookupKind::Gender, "Male").unwrap();

    assert!(matches!(
        repo.create_entry(LookupKind::Gender, "Male"),
        Err(RepoError::LabelTaken {
            kind: LookupKind::Gender,
            ..
        })
    ));
}
