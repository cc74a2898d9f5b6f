//! Core use-case services.
//!
//! # Responsibility
//! - Turn submitted forms into validated repository calls.
//! - Keep the CLI decoupled from validation rules and storage details.
//!
//! # Invariants
//! - Rejected input never reaches storage.
//! - Service logs carry record ids, tag ids and field names only, never
//!   submitted values.

use crate::form::validator::attribute;
use crate::form::ValidationErrors;
use crate::model::record::RecordId;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod clock;
pub mod crab_service;
pub mod lookup_service;
pub mod pond_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by every resource.
#[derive(Debug)]
pub enum ServiceError {
    /// Submitted fields failed validation; nothing was written.
    Validation(ValidationErrors),
    /// Target record does not exist or is removed.
    NotFound { entity: &'static str, id: RecordId },
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl ServiceError {
    /// Stable error code for envelopes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage_failed",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::NotFound { .. } => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::LabelTaken { kind, .. } => {
                Self::Validation(ValidationErrors::single(
                    kind.label_field(),
                    taken_message(kind.label_field()),
                ))
            }
            other => Self::Storage(other),
        }
    }
}

/// Message used when a unique field collides with an existing row.
pub(crate) fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", attribute(field))
}

/// Logs a rejected form by field names and wraps the errors.
pub(crate) fn rejected(event: &str, errors: ValidationErrors) -> ServiceError {
    warn!(
        "event={event} module=service status=rejected fields={}",
        errors.field_names().join(",")
    );
    ServiceError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::model::lookup::LookupKind;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_not_found_maps_to_service_not_found() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(RepoError::NotFound { entity: "crab", id });
        assert!(matches!(err, ServiceError::NotFound { entity: "crab", .. }));
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn label_taken_maps_to_field_error() {
        let err = ServiceError::from(RepoError::LabelTaken {
            kind: LookupKind::CrabType,
            label: "Mud".to_string(),
        });
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("crab_type").unwrap(),
            &["The crab type has already been taken.".to_string()]
        );
    }
}
