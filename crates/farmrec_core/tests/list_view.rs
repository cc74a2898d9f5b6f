use chrono::NaiveDate;
use farmrec_core::db::open_db_in_memory;
use farmrec_core::model::enums::FieldEnum;
use farmrec_core::service::clock::FixedClock;
use farmrec_core::view::{filter_records, ALL_SENTINEL};
use farmrec_core::{
    build_list_view, CrabRecord, CrabService, FormInput, ListCriteria, PageSize, Pond,
    PondService, SqliteCrabRepository, SqlitePondRepository,
};
use rusqlite::Connection;
use std::collections::BTreeMap;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()
}

fn store_pond(conn: &Connection, location: &str, water_type: &str, size: &str) -> Pond {
    PondService::with_clock(SqlitePondRepository::try_new(conn).unwrap(), FixedClock(day()))
        .store(
            &FormInput::new()
                .with("location", location)
                .with("size", size)
                .with("water_type", water_type)
                .with("setup_date", "2025-02-14"),
        )
        .unwrap()
}

fn seed(conn: &Connection) -> (Vec<Pond>, Vec<CrabRecord>) {
    let coastal = store_pond(conn, "Coastal Pond Zone", "Brackish", "120");
    let river = store_pond(conn, "River Pond Area", "Fresh", "75.5");

    let crabs = CrabService::with_clock(
        SqliteCrabRepository::try_new(conn).unwrap(),
        FixedClock(day()),
    );
    for i in 0..12 {
        let pond = if i % 4 == 0 { &river } else { &coastal };
        let gender = if i % 2 == 0 { "Male" } else { "Female" };
        crabs
            .store(
                &FormInput::new()
                    .with("species", "Mud Crab")
                    .with("age_value", i.to_string())
                    .with("age_unit", "days")
                    .with("weight", "0.5")
                    .with("gender", gender)
                    .with("health_status", "Healthy")
                    .with("pond_id", pond.id.to_string()),
            )
            .unwrap();
    }

    let ponds = PondService::new(SqlitePondRepository::try_new(conn).unwrap())
        .list_active()
        .unwrap();
    (ponds, crabs.list_active().unwrap())
}

fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn crab_search_matches_pond_label_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let (ponds, crabs) = seed(&conn);
    let river = ponds
        .iter()
        .find(|pond| pond.location.as_str() == "River Pond Area")
        .unwrap();

    let hits = filter_records(&crabs, &river.tag_id.to_lowercase(), &BTreeMap::new());
    assert_eq!(hits.len(), 3);
    assert!(hits
        .iter()
        .all(|record| record.pond_tag_id.as_deref() == Some(river.tag_id.as_str())));
}

#[test]
fn crab_filters_combine_with_all_sentinel() {
    let conn = open_db_in_memory().unwrap();
    let (_, crabs) = seed(&conn);

    let males = filter_records(
        &crabs,
        "",
        &filters(&[
            ("gender", "Male"),
            ("species", ALL_SENTINEL),
            ("health_status", ALL_SENTINEL),
        ]),
    );
    assert_eq!(males.len(), 6);

    let everything = filter_records(&crabs, "", &filters(&[("gender", ALL_SENTINEL)]));
    assert_eq!(everything, crabs);
}

#[test]
fn pond_search_covers_size_and_setup_date() {
    let conn = open_db_in_memory().unwrap();
    let (ponds, _) = seed(&conn);

    assert_eq!(filter_records(&ponds, "75.5", &BTreeMap::new()).len(), 1);
    assert_eq!(filter_records(&ponds, "2025-02-14", &BTreeMap::new()).len(), 2);
    assert_eq!(
        filter_records(&ponds, "", &filters(&[("water_type", "Fresh")])).len(),
        1
    );
}

#[test]
fn crab_list_view_pages_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let (_, crabs) = seed(&conn);

    let criteria = ListCriteria {
        page: 3,
        page_size: PageSize::Five,
        ..ListCriteria::default()
    };
    let view = build_list_view(&crabs, &criteria);
    assert_eq!(view.filtered_count, 12);
    assert_eq!(view.page_count, 3);
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[1].crab.tag_id, "CRB-2025-04-08-0001");

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["page_size"], 5);
    assert_eq!(json["items"][0]["tag_id"], "CRB-2025-04-08-0002");
}
