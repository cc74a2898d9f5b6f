//! Core domain logic for the crab and pond farm record keeper.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use db::{open_db, open_db_in_memory, DbError};
pub use form::{FormInput, ValidationErrors};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::crab::{Crab, CrabRecord};
pub use model::lookup::{LookupEntry, LookupKind};
pub use model::pond::Pond;
pub use model::record::{RecordId, RecordStatus};
pub use repo::crab_repo::{CrabRepository, SqliteCrabRepository};
pub use repo::lookup_repo::{LookupRepository, SqliteLookupRepository};
pub use repo::pond_repo::{PondRepository, SqlitePondRepository};
pub use repo::{RepoError, RepoResult};
pub use service::crab_service::CrabService;
pub use service::lookup_service::LookupService;
pub use service::pond_service::PondService;
pub use service::{ServiceError, ServiceResult};
pub use view::{build_list_view, ListCriteria, ListView, PageSize};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
