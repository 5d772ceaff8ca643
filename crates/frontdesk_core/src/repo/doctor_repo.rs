//! Doctor repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A doctor always references an existing department; callers check
//!   this before `create_doctor` to report a friendly error, the foreign
//!   key enforces it regardless.

use super::{count_where, RepoError, RepoResult};
use crate::model::validation::non_blank;
use crate::model::{Doctor, DoctorSummary, NewDoctor};
use rusqlite::{params, Connection, Row};

const DOCTOR_COLUMNS: &str = "d.doctor_id,
    d.doctor_name,
    d.gender,
    d.title,
    d.department_id,
    d.phone,
    d.email,
    d.specialization,
    d.created_at";

/// Repository interface for doctor maintenance and lookup.
pub trait DoctorRepository {
    fn list_by_department(&self, department_id: i64) -> RepoResult<Vec<Doctor>>;
    /// Lists doctors with department names, newest first.
    fn list_with_department(&self) -> RepoResult<Vec<DoctorSummary>>;
    fn create_doctor(&self, doctor: &NewDoctor) -> RepoResult<i64>;
    fn count_registrations(&self, doctor_id: i64) -> RepoResult<i64>;
    fn delete_doctor(&self, doctor_id: i64) -> RepoResult<()>;
}

/// SQLite-backed doctor repository.
pub struct SqliteDoctorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDoctorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DoctorRepository for SqliteDoctorRepository<'_> {
    fn list_by_department(&self, department_id: i64) -> RepoResult<Vec<Doctor>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DOCTOR_COLUMNS}
             FROM doctor d
             WHERE d.department_id = ?1
             ORDER BY d.doctor_id ASC;"
        ))?;
        let mut rows = stmt.query([department_id])?;
        let mut doctors = Vec::new();
        while let Some(row) = rows.next()? {
            doctors.push(parse_doctor_row(row)?);
        }
        Ok(doctors)
    }

    fn list_with_department(&self) -> RepoResult<Vec<DoctorSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DOCTOR_COLUMNS}, dept.department_name
             FROM doctor d
             JOIN department dept ON d.department_id = dept.department_id
             ORDER BY d.doctor_id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut doctors = Vec::new();
        while let Some(row) = rows.next()? {
            doctors.push(DoctorSummary {
                doctor: parse_doctor_row(row)?,
                department_name: row.get("department_name")?,
            });
        }
        Ok(doctors)
    }

    fn create_doctor(&self, doctor: &NewDoctor) -> RepoResult<i64> {
        doctor.validate()?;

        self.conn.execute(
            "INSERT INTO doctor (
                doctor_name,
                gender,
                title,
                department_id,
                phone,
                email,
                specialization
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                doctor.doctor_name.trim(),
                doctor.gender.trim(),
                doctor.title.trim(),
                doctor.department_id,
                doctor.phone.trim(),
                non_blank(doctor.email.as_deref()),
                non_blank(doctor.specialization.as_deref()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_registrations(&self, doctor_id: i64) -> RepoResult<i64> {
        count_where(
            self.conn,
            "SELECT COUNT(*) FROM registration WHERE doctor_id = ?1;",
            doctor_id,
        )
    }

    fn delete_doctor(&self, doctor_id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM doctor WHERE doctor_id = ?1;", [doctor_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "doctor",
                id: doctor_id,
            });
        }
        Ok(())
    }
}

fn parse_doctor_row(row: &Row<'_>) -> RepoResult<Doctor> {
    Ok(Doctor {
        doctor_id: row.get("doctor_id")?,
        doctor_name: row.get("doctor_name")?,
        gender: row.get("gender")?,
        title: row.get("title")?,
        department_id: row.get("department_id")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        specialization: row.get("specialization")?,
        created_at: row.get("created_at")?,
    })
}
