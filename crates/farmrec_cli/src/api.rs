//! Resource actions behind the CLI subcommands.
//!
//! # Responsibility
//! - Build page payloads (index, forms, detail) for each resource.
//! - Run mutations and fold their outcome into one action envelope.
//!
//! # Invariants
//! - Mutations never return `Err`; every failure is an envelope with
//!   `ok=false`.
//! - Validation failures carry per-field messages in `errors`.

use farmrec_core::model::enums::{CrabEnumOptions, FieldEnum, PondEnumOptions};
use farmrec_core::{
    build_list_view, CrabRecord, CrabService, FormInput, ListCriteria, ListView, LookupEntry,
    LookupKind, LookupService, Pond, PondService, RecordId, ServiceError,
    SqliteCrabRepository, SqliteLookupRepository, SqlitePondRepository, ValidationErrors,
};
use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CRABS_ROUTE: &str = "/crabs";
const PONDS_ROUTE: &str = "/ponds";
const VALIDATION_MESSAGE: &str = "The given data was invalid.";

/// Failure while building a page payload.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Outcome envelope of every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    pub id: Option<String>,
    pub tag_id: Option<String>,
    /// Flash message shown after the redirect.
    pub message: String,
    /// Index route to return to on success.
    pub redirect: Option<String>,
    pub errors: ValidationErrors,
}

impl ActionResponse {
    fn success(
        message: impl Into<String>,
        redirect: &str,
        id: RecordId,
        tag_id: Option<&str>,
    ) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            tag_id: tag_id.map(str::to_string),
            message: message.into(),
            redirect: Some(redirect.to_string()),
            errors: ValidationErrors::new(),
        }
    }

    fn failure(action: &str, err: ServiceError) -> Self {
        warn!(
            "event=api_action module=cli status=error action={action} error_code={}",
            err.code()
        );
        let (message, errors) = match err {
            ServiceError::Validation(errors) => (VALIDATION_MESSAGE.to_string(), errors),
            other => (format!("{action} failed: {other}"), ValidationErrors::new()),
        };
        Self {
            ok: false,
            id: None,
            tag_id: None,
            message,
            redirect: None,
            errors,
        }
    }
}

/// Active pond as offered by crab forms and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PondOption {
    pub id: String,
    pub tag_id: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrabIndexPage {
    pub crabs: ListView<CrabRecord>,
    pub criteria: ListCriteria,
    /// Pond filter values, ordered by tag id.
    pub ponds: Vec<PondOption>,
    pub enums: CrabEnumOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrabFormPage {
    /// Crab being edited; `None` on the create form.
    pub crab: Option<CrabRecord>,
    /// Tag id the next stored crab would receive; create form only.
    pub next_tag_id: Option<String>,
    pub ponds: Vec<PondOption>,
    pub enums: CrabEnumOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PondIndexPage {
    pub ponds: ListView<Pond>,
    pub criteria: ListCriteria,
    pub enums: PondEnumOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PondFormPage {
    pub pond: Option<Pond>,
    pub next_tag_id: Option<String>,
    pub enums: PondEnumOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PondShowPage {
    pub pond: Pond,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupIndexPage {
    pub kind: LookupKind,
    pub entries: Vec<LookupEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFormPage {
    pub entry: LookupEntry,
}

/// Every option list, for form builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumsPage {
    pub crab: CrabEnumOptions,
    pub pond: PondEnumOptions,
}

pub fn crab_index(conn: &Connection, criteria: ListCriteria) -> ApiResult<CrabIndexPage> {
    let crabs = crab_service(conn)?.list_active()?;
    Ok(CrabIndexPage {
        crabs: build_list_view(&crabs, &criteria),
        criteria,
        ponds: pond_options(conn)?,
        enums: CrabEnumOptions::build(),
    })
}

pub fn crab_create_form(conn: &Connection) -> ApiResult<CrabFormPage> {
    Ok(CrabFormPage {
        crab: None,
        next_tag_id: Some(crab_service(conn)?.next_tag_id()?),
        ponds: pond_options(conn)?,
        enums: CrabEnumOptions::build(),
    })
}

pub fn crab_edit_form(conn: &Connection, id: RecordId) -> ApiResult<CrabFormPage> {
    Ok(CrabFormPage {
        crab: Some(crab_service(conn)?.get(id)?),
        next_tag_id: None,
        ponds: pond_options(conn)?,
        enums: CrabEnumOptions::build(),
    })
}

pub fn crab_store(conn: &Connection, input: &FormInput) -> ActionResponse {
    match crab_service(conn).and_then(|service| service.store(input)) {
        Ok(record) => ActionResponse::success(
            "Crab created successfully!",
            CRABS_ROUTE,
            record.crab.id,
            Some(&record.crab.tag_id),
        ),
        Err(err) => ActionResponse::failure("crab_store", err),
    }
}

pub fn crab_update(conn: &Connection, id: RecordId, input: &FormInput) -> ActionResponse {
    match crab_service(conn).and_then(|service| service.update(id, input)) {
        Ok(record) => ActionResponse::success(
            "Crab updated successfully!",
            CRABS_ROUTE,
            record.crab.id,
            Some(&record.crab.tag_id),
        ),
        Err(err) => ActionResponse::failure("crab_update", err),
    }
}

pub fn crab_destroy(conn: &Connection, id: RecordId, input: &FormInput) -> ActionResponse {
    match crab_service(conn).and_then(|service| service.destroy(id, input)) {
        Ok(record) => ActionResponse::success(
            "Crab deleted successfully.",
            CRABS_ROUTE,
            record.crab.id,
            Some(&record.crab.tag_id),
        ),
        Err(err) => ActionResponse::failure("crab_destroy", err),
    }
}

pub fn pond_index(conn: &Connection, criteria: ListCriteria) -> ApiResult<PondIndexPage> {
    let ponds = pond_service(conn)?.list_active()?;
    Ok(PondIndexPage {
        ponds: build_list_view(&ponds, &criteria),
        criteria,
        enums: PondEnumOptions::build(),
    })
}

pub fn pond_create_form(conn: &Connection) -> ApiResult<PondFormPage> {
    Ok(PondFormPage {
        pond: None,
        next_tag_id: Some(pond_service(conn)?.next_tag_id()?),
        enums: PondEnumOptions::build(),
    })
}

pub fn pond_show(conn: &Connection, id: RecordId) -> ApiResult<PondShowPage> {
    Ok(PondShowPage {
        pond: pond_service(conn)?.get(id)?,
    })
}

pub fn pond_edit_form(conn: &Connection, id: RecordId) -> ApiResult<PondFormPage> {
    Ok(PondFormPage {
        pond: Some(pond_service(conn)?.get(id)?),
        next_tag_id: None,
        enums: PondEnumOptions::build(),
    })
}

pub fn pond_store(conn: &Connection, input: &FormInput) -> ActionResponse {
    match pond_service(conn).and_then(|service| service.store(input)) {
        Ok(pond) => ActionResponse::success(
            "Pond created successfully!",
            PONDS_ROUTE,
            pond.id,
            Some(&pond.tag_id),
        ),
        Err(err) => ActionResponse::failure("pond_store", err),
    }
}

pub fn pond_update(conn: &Connection, id: RecordId, input: &FormInput) -> ActionResponse {
    match pond_service(conn).and_then(|service| service.update(id, input)) {
        Ok(pond) => ActionResponse::success(
            "Pond updated successfully",
            PONDS_ROUTE,
            pond.id,
            Some(&pond.tag_id),
        ),
        Err(err) => ActionResponse::failure("pond_update", err),
    }
}

pub fn pond_destroy(conn: &Connection, id: RecordId, input: &FormInput) -> ActionResponse {
    match pond_service(conn).and_then(|service| service.destroy(id, input)) {
        Ok(pond) => ActionResponse::success(
            "Pond deleted successfully",
            PONDS_ROUTE,
            pond.id,
            Some(&pond.tag_id),
        ),
        Err(err) => ActionResponse::failure("pond_destroy", err),
    }
}

pub fn lookup_index(conn: &Connection, kind: LookupKind) -> ApiResult<LookupIndexPage> {
    Ok(LookupIndexPage {
        kind,
        entries: lookup_service(conn)?.list(kind)?,
    })
}

pub fn lookup_edit_form(
    conn: &Connection,
    kind: LookupKind,
    id: RecordId,
) -> ApiResult<LookupFormPage> {
    Ok(LookupFormPage {
        entry: lookup_service(conn)?.get(kind, id)?,
    })
}

pub fn lookup_store(conn: &Connection, kind: LookupKind, input: &FormInput) -> ActionResponse {
    match lookup_service(conn).and_then(|service| service.store(kind, input)) {
        Ok(entry) => ActionResponse::success(
            format!("{} added successfully!", lookup_title(kind)),
            lookup_route(kind),
            entry.id,
            None,
        ),
        Err(err) => ActionResponse::failure("lookup_store", err),
    }
}

pub fn lookup_update(
    conn: &Connection,
    kind: LookupKind,
    id: RecordId,
    input: &FormInput,
) -> ActionResponse {
    match lookup_service(conn).and_then(|service| service.update(kind, id, input)) {
        Ok(entry) => ActionResponse::success(
            format!("{} updated successfully!", lookup_title(kind)),
            lookup_route(kind),
            entry.id,
            None,
        ),
        Err(err) => ActionResponse::failure("lookup_update", err),
    }
}

pub fn lookup_destroy(conn: &Connection, kind: LookupKind, id: RecordId) -> ActionResponse {
    match lookup_service(conn).and_then(|service| service.destroy(kind, id)) {
        Ok(()) => ActionResponse::success(
            format!("{} deleted successfully!", lookup_title(kind)),
            lookup_route(kind),
            id,
            None,
        ),
        Err(err) => ActionResponse::failure("lookup_destroy", err),
    }
}

pub fn enums() -> EnumsPage {
    EnumsPage {
        crab: CrabEnumOptions::build(),
        pond: PondEnumOptions::build(),
    }
}

fn crab_service(
    conn: &Connection,
) -> Result<CrabService<SqliteCrabRepository<'_>>, ServiceError> {
    Ok(CrabService::new(SqliteCrabRepository::try_new(conn)?))
}

fn pond_service(
    conn: &Connection,
) -> Result<PondService<SqlitePondRepository<'_>>, ServiceError> {
    Ok(PondService::new(SqlitePondRepository::try_new(conn)?))
}

fn lookup_service(
    conn: &Connection,
) -> Result<LookupService<SqliteLookupRepository<'_>>, ServiceError> {
    Ok(LookupService::new(SqliteLookupRepository::try_new(conn)?))
}

fn pond_options(conn: &Connection) -> ApiResult<Vec<PondOption>> {
    let mut options: Vec<PondOption> = pond_service(conn)?
        .list_active()?
        .into_iter()
        .map(|pond| PondOption {
            id: pond.id.to_string(),
            tag_id: pond.tag_id,
            location: pond.location.as_str().to_string(),
        })
        .collect();
    options.sort_by(|a, b| a.tag_id.cmp(&b.tag_id));
    Ok(options)
}

fn lookup_title(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Gender => "Gender",
        LookupKind::CrabType => "Crab type",
    }
}

fn lookup_route(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Gender => "/utilities/crab/genders",
        LookupKind::CrabType => "/utilities/crab/crab-types",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        crab_create_form, crab_destroy, crab_index, crab_store, crab_update, lookup_destroy,
        lookup_index, lookup_store, pond_show, pond_store,
    };
    use farmrec_core::db::open_db_in_memory;
    use farmrec_core::{FormInput, ListCriteria, LookupKind};
    use rusqlite::Connection;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn store_pond(conn: &Connection) -> String {
        let response = pond_store(
            conn,
            &FormInput::new()
                .with("location", "Coastal Pond Zone")
                .with("size", "60")
                .with("water_type", "Brackish")
                .with("setup_date", "2025-01-01"),
        );
        assert!(response.ok, "{}", response.message);
        response.id.unwrap()
    }

    fn crab_form(pond_id: &str) -> FormInput {
        FormInput::new()
            .with("species", "Mud Crab")
            .with("age_value", "5")
            .with("age_unit", "days")
            .with("weight", "0.2")
            .with("gender", "Undetermined")
            .with("health_status", "Healthy")
            .with("pond_id", pond_id)
    }

    #[test]
    fn store_returns_flash_message_and_tag() {
        let conn = open_db_in_memory().unwrap();
        let pond_id = store_pond(&conn);

        let response = crab_store(&conn, &crab_form(&pond_id));
        assert!(response.ok);
        assert_eq!(response.message, "Crab created successfully!");
        assert_eq!(response.redirect.as_deref(), Some("/crabs"));
        assert!(response.tag_id.unwrap().starts_with("CRB-"));
        assert!(response.errors.is_empty());
    }

    #[test]
    fn invalid_store_returns_field_errors_as_json() {
        let conn = open_db_in_memory().unwrap();
        let pond_id = store_pond(&conn);

        let response = crab_store(&conn, &crab_form(&pond_id).with("species", ""));
        assert!(!response.ok);
        assert_eq!(response.redirect, None);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errors"]["species"][0], "The species field is required.");
        assert_eq!(json["message"], "The given data was invalid.");
    }

    #[test]
    fn unknown_target_returns_not_found_envelope() {
        let conn = open_db_in_memory().unwrap();
        let response = crab_update(&conn, Uuid::new_v4(), &FormInput::new());
        assert!(!response.ok);
        assert!(response.message.contains("crab not found"));
    }

    #[test]
    fn crab_index_embeds_list_view_and_pond_filters() {
        let conn = open_db_in_memory().unwrap();
        let pond_id = store_pond(&conn);
        for _ in 0..3 {
            assert!(crab_store(&conn, &crab_form(&pond_id)).ok);
        }
        let first = crab_store(&conn, &crab_form(&pond_id));
        let removed = crab_destroy(
            &conn,
            first.id.unwrap().parse().unwrap(),
            &FormInput::new().with("removal_reason", "Sold"),
        );
        assert!(removed.ok);
        assert_eq!(removed.message, "Crab deleted successfully.");

        let criteria = ListCriteria {
            filters: BTreeMap::from([("gender".to_string(), "All".to_string())]),
            ..ListCriteria::default()
        };
        let page = crab_index(&conn, criteria).unwrap();
        assert_eq!(page.crabs.filtered_count, 3);
        assert_eq!(page.ponds.len(), 1);
        assert_eq!(page.ponds[0].id, pond_id);
        assert_eq!(page.enums.removal_reason.len(), 4);
    }

    #[test]
    fn create_form_previews_next_tag() {
        let conn = open_db_in_memory().unwrap();
        let page = crab_create_form(&conn).unwrap();
        assert!(page.next_tag_id.unwrap().ends_with("-0001"));
        assert!(page.crab.is_none());
    }

    #[test]
    fn removed_pond_cannot_be_shown() {
        let conn = open_db_in_memory().unwrap();
        let pond_id: Uuid = store_pond(&conn).parse().unwrap();
        assert!(pond_show(&conn, pond_id).is_ok());
        assert!(
            super::pond_destroy(
                &conn,
                pond_id,
                &FormInput::new().with("removal_reason", "Other")
            )
            .ok
        );
        assert!(pond_show(&conn, pond_id).is_err());
    }

    #[test]
    fn lookup_actions_use_their_own_messages() {
        let conn = open_db_in_memory().unwrap();
        let stored = lookup_store(
            &conn,
            LookupKind::CrabType,
            &FormInput::new().with("crab_type", "Mud"),
        );
        assert_eq!(stored.message, "Crab type added successfully!");
        assert_eq!(
            lookup_index(&conn, LookupKind::CrabType).unwrap().entries.len(),
            1
        );

        let id = stored.id.unwrap().parse().unwrap();
        let deleted = lookup_destroy(&conn, LookupKind::CrabType, id);
        assert_eq!(deleted.message, "Crab type deleted successfully!");
        assert!(lookup_index(&conn, LookupKind::CrabType)
            .unwrap()
            .entries
            .is_empty());
    }
}
