//! Pond use-case service.
//!
//! # Invariants
//! - Update never changes `id` or `tag_id`; blank nullable fields clear the
//!   stored reading.
//! - Destroy requires a pond removal reason.

use crate::form::{validate_new_pond, validate_pond_changes, validate_removal, FormInput};
use crate::model::enums::PondRemovalReason;
use crate::model::pond::Pond;
use crate::model::record::RecordId;
use crate::model::tag_id::{next_tag_id, TagPrefix};
use crate::repo::pond_repo::PondRepository;
use crate::service::clock::{Clock, SystemClock};
use crate::service::{rejected, ServiceError, ServiceResult};
use log::info;

const ENTITY: &str = "pond";

/// Pond service facade over repository implementations.
pub struct PondService<R: PondRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: PondRepository> PondService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: PondRepository, C: Clock> PondService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn store(&self, input: &FormInput) -> ServiceResult<Pond> {
        let pond = validate_new_pond(input).map_err(|errors| rejected("pond_store", errors))?;
        let pond = self.repo.create_pond(&pond, self.clock.today())?;
        info!(
            "event=pond_store module=service status=ok id={} tag_id={}",
            pond.id, pond.tag_id
        );
        Ok(pond)
    }

    pub fn update(&self, id: RecordId, input: &FormInput) -> ServiceResult<Pond> {
        let changes =
            validate_pond_changes(input).map_err(|errors| rejected("pond_update", errors))?;
        let mut pond = self.get(id)?;
        pond.apply(&changes);
        self.repo.update_pond(&pond)?;
        info!(
            "event=pond_update module=service status=ok id={} tag_id={}",
            pond.id, pond.tag_id
        );
        self.get(id)
    }

    /// Removes an active pond. Crabs assigned to it keep their `pond_id`.
    pub fn destroy(&self, id: RecordId, input: &FormInput) -> ServiceResult<Pond> {
        let reason = validate_removal::<PondRemovalReason>(input)
            .map_err(|errors| rejected("pond_destroy", errors))?;
        self.repo.remove_pond(id, reason)?;

        let pond = self
            .repo
            .get_pond(id, true)?
            .ok_or(ServiceError::NotFound { entity: ENTITY, id })?;
        info!(
            "event=pond_destroy module=service status=ok id={} tag_id={} reason={}",
            id, pond.tag_id, reason
        );
        Ok(pond)
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Pond> {
        self.repo
            .get_pond(id, false)?
            .ok_or(ServiceError::NotFound { entity: ENTITY, id })
    }

    pub fn list_active(&self) -> ServiceResult<Vec<Pond>> {
        Ok(self.repo.list_active_ponds()?)
    }

    pub fn next_tag_id(&self) -> ServiceResult<String> {
        let day = self.clock.today();
        let latest = self.repo.latest_tag_id(day)?;
        let tag = next_tag_id(TagPrefix::Pond, day, latest.as_deref())
            .map_err(|err| ServiceError::Storage(err.into()))?;
        Ok(tag.to_string())
    }
}
