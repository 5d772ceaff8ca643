//! Registration read models: doctor queue, diagnosis header, patient history.
//!
//! Registrations are written only by stored procedures and triggers.

use super::{RepoError, RepoResult};
use crate::model::{DiagnosisSubject, PatientRegistration, RegistrationStatus, WaitingPatient};
use rusqlite::{Connection, OptionalExtension, Row};

/// Repository interface for registration queries.
pub trait RegistrationRepository {
    /// Registrations awaiting consultation with `doctor_id`, oldest first.
    fn waiting_list(&self, doctor_id: i64) -> RepoResult<Vec<WaitingPatient>>;
    fn diagnosis_subject(&self, registration_id: i64) -> RepoResult<Option<DiagnosisSubject>>;
    /// Registration history of a patient, newest first.
    fn registrations_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientRegistration>>;
}

/// SQLite-backed registration repository.
pub struct SqliteRegistrationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RegistrationRepository for SqliteRegistrationRepository<'_> {
    fn waiting_list(&self, doctor_id: i64) -> RepoResult<Vec<WaitingPatient>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                r.registration_id,
                r.patient_id,
                p.patient_name,
                p.gender,
                p.phone,
                r.registration_date,
                r.registration_time,
                r.chief_complaint,
                r.status
             FROM registration r
             JOIN patient p ON r.patient_id = p.patient_id
             WHERE r.doctor_id = ?1
               AND r.status = ?2
             ORDER BY r.registration_date, r.registration_time, r.registration_id;",
        )?;
        let mut rows = stmt.query([
            doctor_id,
            RegistrationStatus::AwaitingConsultation.to_db(),
        ])?;
        let mut waiting = Vec::new();
        while let Some(row) = rows.next()? {
            waiting.push(WaitingPatient {
                registration_id: row.get("registration_id")?,
                patient_id: row.get("patient_id")?,
                patient_name: row.get("patient_name")?,
                gender: row.get("gender")?,
                phone: row.get("phone")?,
                registration_date: row.get("registration_date")?,
                registration_time: row.get("registration_time")?,
                chief_complaint: row.get("chief_complaint")?,
                status: parse_status(row)?,
            });
        }
        Ok(waiting)
    }

    fn diagnosis_subject(&self, registration_id: i64) -> RepoResult<Option<DiagnosisSubject>> {
        let subject = self
            .conn
            .query_row(
                "SELECT
                    r.registration_id,
                    r.patient_id,
                    p.patient_name,
                    p.gender,
                    p.date_of_birth,
                    p.phone,
                    r.registration_date,
                    r.registration_time,
                    r.chief_complaint,
                    r.status,
                    d.department_name,
                    doc.doctor_name
                 FROM registration r
                 JOIN patient p ON r.patient_id = p.patient_id
                 JOIN department d ON r.department_id = d.department_id
                 LEFT JOIN doctor doc ON r.doctor_id = doc.doctor_id
                 WHERE r.registration_id = ?1;",
                [registration_id],
                |row| Ok(parse_diagnosis_subject(row)),
            )
            .optional()?;
        subject.transpose()
    }

    fn registrations_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientRegistration>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                r.registration_id,
                r.registration_date,
                r.registration_time,
                r.status,
                r.fee,
                r.chief_complaint,
                d.department_name,
                doc.doctor_name
             FROM registration r
             JOIN department d ON r.department_id = d.department_id
             LEFT JOIN doctor doc ON r.doctor_id = doc.doctor_id
             WHERE r.patient_id = ?1
             ORDER BY r.registration_date DESC, r.registration_time DESC, r.registration_id DESC;",
        )?;
        let mut rows = stmt.query([patient_id])?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next()? {
            let status = parse_status(row)?;
            registrations.push(PatientRegistration {
                registration_id: row.get("registration_id")?,
                registration_date: row.get("registration_date")?,
                registration_time: row.get("registration_time")?,
                status,
                status_text: status.label(),
                fee: row.get("fee")?,
                chief_complaint: row.get("chief_complaint")?,
                department_name: row.get("department_name")?,
                doctor_name: row.get("doctor_name")?,
            });
        }
        Ok(registrations)
    }
}

fn parse_diagnosis_subject(row: &Row<'_>) -> RepoResult<DiagnosisSubject> {
    Ok(DiagnosisSubject {
        registration_id: row.get("registration_id")?,
        patient_id: row.get("patient_id")?,
        patient_name: row.get("patient_name")?,
        gender: row.get("gender")?,
        date_of_birth: row.get("date_of_birth")?,
        phone: row.get("phone")?,
        registration_date: row.get("registration_date")?,
        registration_time: row.get("registration_time")?,
        chief_complaint: row.get("chief_complaint")?,
        department_name: row.get("department_name")?,
        doctor_name: row.get("doctor_name")?,
        status: parse_status(row)?,
    })
}

fn parse_status(row: &Row<'_>) -> RepoResult<RegistrationStatus> {
    let value: i64 = row.get("status")?;
    RegistrationStatus::from_db(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{value}` in registration.status"
        ))
    })
}
