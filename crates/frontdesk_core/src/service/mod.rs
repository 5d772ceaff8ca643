//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and stored-procedure calls into the front-desk
//!   use cases (registration, consultation, billing, inventory, patient
//!   portal, admin data maintenance).
//! - Keep the web layer decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation or procedure contracts.
//! - Business-rule violations surface as `ServiceError::Signal`, never as
//!   raw storage errors.

use crate::db::{DbError, DomainSignal};
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod admin_service;
pub mod billing_service;
pub mod consultation_service;
pub mod inventory_service;
pub mod patient_service;
pub mod registration_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for front-desk use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input record failed validation.
    Validation(ValidationError),
    /// Business rule raised by a trigger or stored procedure.
    Signal(DomainSignal),
    /// Unique value (ID card, drug code, department name) already taken.
    Duplicate(String),
    /// Diagnosis submitted without any prescription line.
    EmptyPrescription,
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl ServiceError {
    /// True for errors caused by user input or business rules, as opposed
    /// to storage failures.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Signal(signal) => write!(f, "{signal}"),
            Self::Duplicate(message) => write!(f, "{message}"),
            Self::EmptyPrescription => write!(f, "no prescription lines were provided"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Signal(signal) => Some(signal),
            Self::Storage(err) => Some(err),
            Self::Duplicate(_) | Self::EmptyPrescription => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Db(DbError::Signal(signal)) => Self::Signal(signal),
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::from(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(RepoError::from(value))
    }
}

/// Result of an admin delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { entity: &'static str },
    /// Dependent records prevent deletion.
    Blocked { reason: String },
    NotFound { entity: &'static str, id: i64 },
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Human-readable message for the admin page.
    pub fn message(&self) -> String {
        match self {
            Self::Deleted { entity } => format!("{} deleted successfully", capitalize(entity)),
            Self::Blocked { reason } => reason.clone(),
            Self::NotFound { entity, id } => {
                format!("{} ID {id} does not exist", capitalize(entity))
            }
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteOutcome, ServiceError};
    use crate::db::{DbError, DomainSignal, SignalCode};
    use crate::repo::RepoError;

    #[test]
    fn signal_inside_repo_error_is_lifted() {
        let signal = DomainSignal::new(SignalCode::InsufficientStock, "out of stock");
        let err = ServiceError::from(RepoError::Db(DbError::Signal(signal.clone())));
        assert!(matches!(err, ServiceError::Signal(ref s) if *s == signal));
        assert!(err.is_user_facing());
    }

    #[test]
    fn delete_outcome_messages_name_the_entity() {
        assert_eq!(
            DeleteOutcome::Deleted { entity: "drug" }.message(),
            "Drug deleted successfully"
        );
        assert_eq!(
            DeleteOutcome::NotFound {
                entity: "doctor",
                id: 9
            }
            .message(),
            "Doctor ID 9 does not exist"
        );
    }
}
