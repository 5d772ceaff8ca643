//! Patient repository contracts and SQLite implementation.
//!
//! Patient inserts go through `sp_add_patient`; this repository covers
//! lookup, listing and deletion.

use super::{count_where, RepoError, RepoResult};
use crate::model::Patient;
use rusqlite::{Connection, OptionalExtension, Row};

const PATIENT_SELECT_SQL: &str = "SELECT
    patient_id,
    patient_name,
    gender,
    date_of_birth,
    phone,
    address,
    id_card,
    created_at
FROM patient";

/// Repository interface for patient lookup and maintenance.
pub trait PatientRepository {
    fn find_by_id_card(&self, id_card: &str) -> RepoResult<Option<Patient>>;
    fn get_patient(&self, patient_id: i64) -> RepoResult<Option<Patient>>;
    /// Lists patients newest first.
    fn list_patients(&self) -> RepoResult<Vec<Patient>>;
    fn count_registrations(&self, patient_id: i64) -> RepoResult<i64>;
    fn delete_patient(&self, patient_id: i64) -> RepoResult<()>;
}

/// SQLite-backed patient repository.
pub struct SqlitePatientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePatientRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, filter: &str, value: &dyn rusqlite::ToSql) -> RepoResult<Option<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATIENT_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let patient = stmt
            .query_row([value], |row| Ok(parse_patient_row(row)))
            .optional()?;
        patient.transpose()
    }
}

impl PatientRepository for SqlitePatientRepository<'_> {
    fn find_by_id_card(&self, id_card: &str) -> RepoResult<Option<Patient>> {
        self.query_one("id_card", &id_card)
    }

    fn get_patient(&self, patient_id: i64) -> RepoResult<Option<Patient>> {
        self.query_one("patient_id", &patient_id)
    }

    fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATIENT_SELECT_SQL} ORDER BY patient_id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut patients = Vec::new();
        while let Some(row) = rows.next()? {
            patients.push(parse_patient_row(row)?);
        }
        Ok(patients)
    }

    fn count_registrations(&self, patient_id: i64) -> RepoResult<i64> {
        count_where(
            self.conn,
            "SELECT COUNT(*) FROM registration WHERE patient_id = ?1;",
            patient_id,
        )
    }

    fn delete_patient(&self, patient_id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM patient WHERE patient_id = ?1;", [patient_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "patient",
                id: patient_id,
            });
        }
        Ok(())
    }
}

fn parse_patient_row(row: &Row<'_>) -> RepoResult<Patient> {
    Ok(Patient {
        patient_id: row.get("patient_id")?,
        patient_name: row.get("patient_name")?,
        gender: row.get("gender")?,
        date_of_birth: row.get("date_of_birth")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        id_card: row.get("id_card")?,
        created_at: row.get("created_at")?,
    })
}
