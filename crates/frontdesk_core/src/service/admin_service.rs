//! Admin data maintenance use-case service.
//!
//! # Responsibility
//! - Add and list patients, doctors, departments and drugs.
//! - Delete records only when nothing references them.
//!
//! # Invariants
//! - Deletes check dependent rows first; a foreign-key violation that
//!   still slips through is reported as `DeleteOutcome::Blocked`.
//! - Unique collisions surface as `ServiceError::Duplicate`.

use super::{DeleteOutcome, ServiceError, ServiceResult};
use crate::db::{DomainSignal, SignalCode};
use crate::model::{
    Department, DoctorSummary, Drug, NewDepartment, NewDoctor, NewDrug, NewPatient, Patient,
};
use crate::procedure::{call_procedure, AddPatient};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::doctor_repo::{DoctorRepository, SqliteDoctorRepository};
use crate::repo::drug_repo::{DrugRepository, SqliteDrugRepository};
use crate::repo::patient_repo::{PatientRepository, SqlitePatientRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Use-case service for the admin data page.
pub struct AdminService<'conn> {
    conn: &'conn Connection,
    patients: SqlitePatientRepository<'conn>,
    doctors: SqliteDoctorRepository<'conn>,
    departments: SqliteDepartmentRepository<'conn>,
    drugs: SqliteDrugRepository<'conn>,
}

impl<'conn> AdminService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            patients: SqlitePatientRepository::new(conn),
            doctors: SqliteDoctorRepository::new(conn),
            departments: SqliteDepartmentRepository::new(conn),
            drugs: SqliteDrugRepository::new(conn),
        }
    }

    pub fn list_patients(&self) -> ServiceResult<Vec<Patient>> {
        Ok(self.patients.list_patients()?)
    }

    pub fn list_doctors(&self) -> ServiceResult<Vec<DoctorSummary>> {
        Ok(self.doctors.list_with_department()?)
    }

    pub fn list_departments(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.departments.list_departments_newest_first()?)
    }

    pub fn list_drugs(&self) -> ServiceResult<Vec<Drug>> {
        Ok(self.drugs.list_drugs()?)
    }

    /// Adds a patient through `sp_add_patient`.
    pub fn add_patient(&self, patient: &NewPatient) -> ServiceResult<i64> {
        patient.validate()?;
        let output = call_procedure(self.conn, &AddPatient { patient })
            .map_err(RepoError::from)
            .map_err(|err| {
                duplicate_or(
                    err,
                    format!("ID card {} is already registered", patient.id_card.trim()),
                )
            })?;
        info!(
            "event=admin_add module=service status=ok entity=patient id={}",
            output.out
        );
        Ok(output.out)
    }

    /// Adds a doctor; the department must already exist.
    pub fn add_doctor(&self, doctor: &NewDoctor) -> ServiceResult<i64> {
        doctor.validate()?;
        if !self.departments.department_exists(doctor.department_id)? {
            return Err(ServiceError::Signal(DomainSignal::new(
                SignalCode::InvalidReference,
                format!(
                    "Department ID {} does not exist; add the department first",
                    doctor.department_id
                ),
            )));
        }
        let id = self.doctors.create_doctor(doctor)?;
        info!("event=admin_add module=service status=ok entity=doctor id={id}");
        Ok(id)
    }

    pub fn add_department(&self, department: &NewDepartment) -> ServiceResult<i64> {
        let id = self.departments.create_department(department).map_err(|err| {
            duplicate_or(
                err,
                format!(
                    "Department {} already exists",
                    department.department_name.trim()
                ),
            )
        })?;
        info!("event=admin_add module=service status=ok entity=department id={id}");
        Ok(id)
    }

    /// Adds a drug; a blank expiry date is stored as none.
    pub fn add_drug(&self, drug: &NewDrug) -> ServiceResult<i64> {
        let id = self.drugs.create_drug(drug).map_err(|err| {
            duplicate_or(
                err,
                format!("Drug code {} already exists", drug.drug_code.trim()),
            )
        })?;
        info!("event=admin_add module=service status=ok entity=drug id={id}");
        Ok(id)
    }

    pub fn delete_patient(&self, patient_id: i64) -> ServiceResult<DeleteOutcome> {
        guarded_delete(
            "patient",
            patient_id,
            self.patients.count_registrations(patient_id)?,
            |count| {
                format!(
                    "Cannot delete this patient: {count} registration record(s) exist. Delete them first."
                )
            },
            "Cannot delete this patient because registrations or other records reference it",
            || self.patients.delete_patient(patient_id),
        )
    }

    pub fn delete_doctor(&self, doctor_id: i64) -> ServiceResult<DeleteOutcome> {
        guarded_delete(
            "doctor",
            doctor_id,
            self.doctors.count_registrations(doctor_id)?,
            |count| {
                format!(
                    "Cannot delete this doctor: {count} registration record(s) exist. Delete them first."
                )
            },
            "Cannot delete this doctor because registrations reference it",
            || self.doctors.delete_doctor(doctor_id),
        )
    }

    pub fn delete_department(&self, department_id: i64) -> ServiceResult<DeleteOutcome> {
        guarded_delete(
            "department",
            department_id,
            self.departments.count_doctors(department_id)?,
            |count| {
                format!(
                    "This department still has {count} doctor(s); transfer or delete them first"
                )
            },
            "Cannot delete this department because doctors or other records reference it",
            || self.departments.delete_department(department_id),
        )
    }

    pub fn delete_drug(&self, drug_id: i64) -> ServiceResult<DeleteOutcome> {
        guarded_delete(
            "drug",
            drug_id,
            self.drugs.count_prescriptions(drug_id)?,
            |count| {
                format!(
                    "Cannot delete this drug: it appears in {count} patient prescription(s)"
                )
            },
            "Cannot delete this drug because patient prescriptions include it",
            || self.drugs.delete_drug(drug_id),
        )
    }
}

fn duplicate_or(err: RepoError, message: String) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::Duplicate(message)
    } else {
        ServiceError::from(err)
    }
}

fn guarded_delete(
    entity: &'static str,
    id: i64,
    dependents: i64,
    blocked_by_count: impl FnOnce(i64) -> String,
    blocked_by_constraint: &str,
    delete: impl FnOnce() -> RepoResult<()>,
) -> ServiceResult<DeleteOutcome> {
    let outcome = if dependents > 0 {
        DeleteOutcome::Blocked {
            reason: blocked_by_count(dependents),
        }
    } else {
        match delete() {
            Ok(()) => DeleteOutcome::Deleted { entity },
            Err(RepoError::NotFound { entity, id }) => DeleteOutcome::NotFound { entity, id },
            Err(err) if err.is_foreign_key_violation() => DeleteOutcome::Blocked {
                reason: blocked_by_constraint.to_string(),
            },
            Err(err) => return Err(err.into()),
        }
    };

    let status = if outcome.is_deleted() { "ok" } else { "rejected" };
    info!("event=admin_delete module=service status={status} entity={entity} id={id}");
    Ok(outcome)
}
