//! Crab use-case service.
//!
//! # Responsibility
//! - Validate crab forms and persist the result.
//! - Check that the assigned pond exists and is active.
//! - Preview the tag id the next crab created today would receive.
//!
//! # Invariants
//! - Update never changes `id` or `tag_id`.
//! - Destroy requires a crab removal reason.

use crate::form::{
    validate_crab_changes, validate_new_crab, validate_removal, FormInput, ValidationErrors,
};
use crate::model::crab::CrabRecord;
use crate::model::enums::CrabRemovalReason;
use crate::model::record::RecordId;
use crate::model::tag_id::{next_tag_id, TagPrefix};
use crate::repo::crab_repo::CrabRepository;
use crate::service::clock::{Clock, SystemClock};
use crate::service::{rejected, ServiceError, ServiceResult};
use log::info;

const ENTITY: &str = "crab";
const POND_FIELD: &str = "pond_id";

/// Crab service facade over repository implementations.
pub struct CrabService<R: CrabRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: CrabRepository> CrabService<R> {
    /// Creates a service dating new tag ids with the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: CrabRepository, C: Clock> CrabService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validates a create form and inserts a crab with today's next tag id.
    pub fn store(&self, input: &FormInput) -> ServiceResult<CrabRecord> {
        let crab = validate_new_crab(input).map_err(|errors| rejected("crab_store", errors))?;
        if !self.repo.pond_is_active(crab.pond_id)? {
            return Err(rejected("crab_store", invalid_pond()));
        }

        let record = self.repo.create_crab(&crab, self.clock.today())?;
        info!(
            "event=crab_store module=service status=ok id={} tag_id={}",
            record.crab.id, record.crab.tag_id
        );
        Ok(record)
    }

    /// Applies the submitted fields to an active crab.
    pub fn update(&self, id: RecordId, input: &FormInput) -> ServiceResult<CrabRecord> {
        let changes =
            validate_crab_changes(input).map_err(|errors| rejected("crab_update", errors))?;
        let mut crab = self.get(id)?.crab;
        if let Some(pond_id) = changes.pond_id {
            if !self.repo.pond_is_active(pond_id)? {
                return Err(rejected("crab_update", invalid_pond()));
            }
        }

        crab.apply(&changes);
        self.repo.update_crab(&crab)?;
        info!(
            "event=crab_update module=service status=ok id={} tag_id={}",
            crab.id, crab.tag_id
        );
        self.get(id)
    }

    /// Removes an active crab and returns its removed state.
    pub fn destroy(&self, id: RecordId, input: &FormInput) -> ServiceResult<CrabRecord> {
        let reason = validate_removal::<CrabRemovalReason>(input)
            .map_err(|errors| rejected("crab_destroy", errors))?;
        self.repo.remove_crab(id, reason)?;

        let record = self
            .repo
            .get_crab(id, true)?
            .ok_or(ServiceError::NotFound { entity: ENTITY, id })?;
        info!(
            "event=crab_destroy module=service status=ok id={} tag_id={} reason={}",
            id, record.crab.tag_id, reason
        );
        Ok(record)
    }

    /// Gets one active crab.
    pub fn get(&self, id: RecordId) -> ServiceResult<CrabRecord> {
        self.repo
            .get_crab(id, false)?
            .ok_or(ServiceError::NotFound { entity: ENTITY, id })
    }

    /// Active crabs, newest first.
    pub fn list_active(&self) -> ServiceResult<Vec<CrabRecord>> {
        Ok(self.repo.list_active_crabs()?)
    }

    /// Tag id the next crab stored today would receive if nothing else
    /// is created first.
    pub fn next_tag_id(&self) -> ServiceResult<String> {
        let day = self.clock.today();
        let latest = self.repo.latest_tag_id(day)?;
        let tag = next_tag_id(TagPrefix::Crab, day, latest.as_deref())
            .map_err(|err| ServiceError::Storage(err.into()))?;
        Ok(tag.to_string())
    }
}

fn invalid_pond() -> ValidationErrors {
    ValidationErrors::single(POND_FIELD, "The selected pond id is invalid.")
}
