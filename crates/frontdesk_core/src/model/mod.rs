//! Domain model for the front-desk workflow.
//!
//! # Responsibility
//! - Define read models returned by repositories and services.
//! - Define validated input records for admin data maintenance and
//!   prescriptions.
//!
//! # Invariants
//! - Input records must pass `validate()` before any SQL mutation.
//! - Status enums map 1:1 onto the integer codes stored in SQLite.

pub mod billing;
pub mod directory;
pub mod registration;
pub mod validation;

pub use billing::{PatientPayment, PaymentStatus, PaymentType, PendingPayment};
pub use directory::{
    Department, Doctor, DoctorSummary, Drug, LowStockDrug, NewDepartment, NewDoctor, NewDrug,
    NewPatient, Patient,
};
pub use registration::{
    registration_fee, DiagnosisSubject, PatientPrescription, PatientRegistration,
    PrescriptionItem, RegistrationStatus, WaitingPatient, DEFAULT_DOSAGE, DEFAULT_DURATION_DAYS,
};
pub use validation::ValidationError;
