//! Doctor consultation use-case service.
//!
//! # Responsibility
//! - Provide the doctor's waiting queue and diagnosis page data.
//! - Submit prescriptions through `sp_finish_consultation`.
//!
//! # Invariants
//! - A diagnosis without prescription lines is rejected before any SQL.
//! - All lines of one diagnosis are stored atomically or not at all.

use super::{ServiceError, ServiceResult};
use crate::model::{DiagnosisSubject, Drug, PrescriptionItem, WaitingPatient};
use crate::procedure::{call_procedure, FinishConsultation};
use crate::repo::drug_repo::{DrugRepository, SqliteDrugRepository};
use crate::repo::registration_repo::{RegistrationRepository, SqliteRegistrationRepository};
use rusqlite::Connection;

/// Use-case service for the doctor workflow.
pub struct ConsultationService<'conn> {
    conn: &'conn Connection,
    registrations: SqliteRegistrationRepository<'conn>,
    drugs: SqliteDrugRepository<'conn>,
}

impl<'conn> ConsultationService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            registrations: SqliteRegistrationRepository::new(conn),
            drugs: SqliteDrugRepository::new(conn),
        }
    }

    /// Patients who paid their fee and wait for `doctor_id`.
    pub fn waiting_list(&self, doctor_id: i64) -> ServiceResult<Vec<WaitingPatient>> {
        Ok(self.registrations.waiting_list(doctor_id)?)
    }

    pub fn diagnosis_subject(
        &self,
        registration_id: i64,
    ) -> ServiceResult<Option<DiagnosisSubject>> {
        Ok(self.registrations.diagnosis_subject(registration_id)?)
    }

    /// Drugs that can still be prescribed (stock above zero).
    pub fn prescribable_drugs(&self) -> ServiceResult<Vec<Drug>> {
        Ok(self.drugs.list_in_stock()?)
    }

    /// Stores the prescriptions and completes the registration.
    ///
    /// Returns the created Medicine payment ids in line order.
    pub fn submit_diagnosis(
        &self,
        registration_id: i64,
        items: &[PrescriptionItem],
    ) -> ServiceResult<Vec<i64>> {
        if items.is_empty() {
            return Err(ServiceError::EmptyPrescription);
        }
        for item in items {
            item.validate()?;
        }

        let output = call_procedure(
            self.conn,
            &FinishConsultation {
                registration_id,
                items: items.to_vec(),
                payment_method: None,
            },
        )?;
        Ok(output.out)
    }
}
