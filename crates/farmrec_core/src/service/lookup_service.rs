//! Gender and crab type lookup maintenance.

use crate::form::{validate_lookup_label, FormInput, ValidationErrors};
use crate::model::lookup::{LookupEntry, LookupKind};
use crate::model::record::RecordId;
use crate::repo::lookup_repo::LookupRepository;
use crate::service::{rejected, taken_message, ServiceError, ServiceResult};
use log::info;

pub struct LookupService<R: LookupRepository> {
    repo: R,
}

impl<R: LookupRepository> LookupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Rows of `kind` ordered by label.
    pub fn list(&self, kind: LookupKind) -> ServiceResult<Vec<LookupEntry>> {
        Ok(self.repo.list_entries(kind)?)
    }

    pub fn get(&self, kind: LookupKind, id: RecordId) -> ServiceResult<LookupEntry> {
        self.repo.get_entry(kind, id)?.ok_or(ServiceError::NotFound {
            entity: kind.entity(),
            id,
        })
    }

    pub fn store(&self, kind: LookupKind, input: &FormInput) -> ServiceResult<LookupEntry> {
        let label = self.unique_label(kind, input, None, "lookup_store")?;
        let entry = self.repo.create_entry(kind, &label)?;
        info!(
            "event=lookup_store module=service status=ok kind={} id={}",
            kind.table(),
            entry.id
        );
        Ok(entry)
    }

    pub fn update(
        &self,
        kind: LookupKind,
        id: RecordId,
        input: &FormInput,
    ) -> ServiceResult<LookupEntry> {
        self.get(kind, id)?;
        let label = self.unique_label(kind, input, Some(id), "lookup_update")?;
        self.repo.update_entry(kind, id, &label)?;
        info!(
            "event=lookup_update module=service status=ok kind={} id={id}",
            kind.table()
        );
        self.get(kind, id)
    }

    /// Deletes the row permanently.
    pub fn destroy(&self, kind: LookupKind, id: RecordId) -> ServiceResult<()> {
        self.repo.delete_entry(kind, id)?;
        info!(
            "event=lookup_destroy module=service status=ok kind={} id={id}",
            kind.table()
        );
        Ok(())
    }

    fn unique_label(
        &self,
        kind: LookupKind,
        input: &FormInput,
        except: Option<RecordId>,
        event: &str,
    ) -> ServiceResult<String> {
        let label = validate_lookup_label(input, kind).map_err(|errors| rejected(event, errors))?;
        if self.repo.label_exists(kind, &label, except)? {
            let field = kind.label_field();
            return Err(rejected(
                event,
                ValidationErrors::single(field, taken_message(field)),
            ));
        }
        Ok(label)
    }
}
