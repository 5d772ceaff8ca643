//! Registration use-case service.
//!
//! # Responsibility
//! - Provide department/doctor lookups for the registration form.
//! - Register a patient through `sp_submit_registration` and report the
//!   pending registration fee.
//!
//! # Invariants
//! - Duplicate and unknown-reference rejections come back as
//!   `ServiceError::Signal`.

use super::ServiceResult;
use crate::model::{Department, Doctor};
use crate::procedure::{call_procedure, SubmitRegistration};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::doctor_repo::{DoctorRepository, SqliteDoctorRepository};
use crate::repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Registration form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub patient_id: i64,
    pub department_id: i64,
    pub doctor_id: i64,
    pub payment_method: Option<String>,
    pub chief_complaint: Option<String>,
}

impl RegistrationRequest {
    pub fn new(patient_id: i64, department_id: i64, doctor_id: i64) -> Self {
        Self {
            patient_id,
            department_id,
            doctor_id,
            payment_method: None,
            chief_complaint: None,
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationReceipt {
    pub registration_id: i64,
    /// Unpaid registration fee; `0.0` when no pending fee bill exists.
    pub pending_amount: f64,
}

/// Use-case service for patient registration.
pub struct RegistrationService<'conn> {
    conn: &'conn Connection,
    departments: SqliteDepartmentRepository<'conn>,
    doctors: SqliteDoctorRepository<'conn>,
    payments: SqlitePaymentRepository<'conn>,
}

impl<'conn> RegistrationService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            departments: SqliteDepartmentRepository::new(conn),
            doctors: SqliteDoctorRepository::new(conn),
            payments: SqlitePaymentRepository::new(conn),
        }
    }

    pub fn departments(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.departments.list_departments()?)
    }

    pub fn doctors_by_department(&self, department_id: i64) -> ServiceResult<Vec<Doctor>> {
        Ok(self.doctors.list_by_department(department_id)?)
    }

    /// Registers a patient and returns the new id with the fee to pay.
    pub fn register_patient(
        &self,
        request: &RegistrationRequest,
    ) -> ServiceResult<RegistrationReceipt> {
        let output = call_procedure(
            self.conn,
            &SubmitRegistration {
                patient_id: request.patient_id,
                department_id: request.department_id,
                doctor_id: request.doctor_id,
                payment_method: request.payment_method.clone(),
                chief_complaint: request.chief_complaint.clone(),
            },
        )?;
        let registration_id = output.out;

        let emitted_amount = output
            .result_sets
            .first()
            .and_then(|set| set.value(0, "amount"))
            .and_then(|value| match value {
                Value::Real(amount) => Some(*amount),
                Value::Integer(amount) => Some(*amount as f64),
                _ => None,
            });
        let pending_amount = match emitted_amount {
            Some(amount) => amount,
            None => self
                .payments
                .pending_registration_amount(registration_id)?
                .unwrap_or(0.0),
        };

        Ok(RegistrationReceipt {
            registration_id,
            pending_amount,
        })
    }
}
