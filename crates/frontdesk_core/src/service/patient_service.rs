//! Patient portal use-case service.
//!
//! # Responsibility
//! - Identify a patient by ID card number.
//! - Provide registration, prescription and payment history.

use super::ServiceResult;
use crate::model::{PatientPayment, PatientPrescription, PatientRegistration, Patient};
use crate::repo::patient_repo::{PatientRepository, SqlitePatientRepository};
use crate::repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
use crate::repo::prescription_repo::{PrescriptionRepository, SqlitePrescriptionRepository};
use crate::repo::registration_repo::{RegistrationRepository, SqliteRegistrationRepository};
use rusqlite::Connection;

/// Use-case service for the patient self-service portal.
pub struct PatientPortalService<'conn> {
    patients: SqlitePatientRepository<'conn>,
    registrations: SqliteRegistrationRepository<'conn>,
    prescriptions: SqlitePrescriptionRepository<'conn>,
    payments: SqlitePaymentRepository<'conn>,
}

impl<'conn> PatientPortalService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            patients: SqlitePatientRepository::new(conn),
            registrations: SqliteRegistrationRepository::new(conn),
            prescriptions: SqlitePrescriptionRepository::new(conn),
            payments: SqlitePaymentRepository::new(conn),
        }
    }

    /// Looks a patient up by ID card; blank input never matches.
    pub fn authenticate(&self, id_card: &str) -> ServiceResult<Option<Patient>> {
        let id_card = id_card.trim();
        if id_card.is_empty() {
            return Ok(None);
        }
        Ok(self.patients.find_by_id_card(id_card)?)
    }

    pub fn registrations(&self, patient_id: i64) -> ServiceResult<Vec<PatientRegistration>> {
        Ok(self.registrations.registrations_for_patient(patient_id)?)
    }

    pub fn prescriptions(&self, patient_id: i64) -> ServiceResult<Vec<PatientPrescription>> {
        Ok(self.prescriptions.prescriptions_for_patient(patient_id)?)
    }

    pub fn payments(&self, patient_id: i64) -> ServiceResult<Vec<PatientPayment>> {
        Ok(self.payments.payments_for_patient(patient_id)?)
    }
}
