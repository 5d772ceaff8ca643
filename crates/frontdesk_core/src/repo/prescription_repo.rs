//! Prescription read models for the patient portal.

use super::RepoResult;
use crate::model::PatientPrescription;
use rusqlite::Connection;

/// Repository interface for prescription queries.
pub trait PrescriptionRepository {
    /// Prescriptions of a patient with line totals, newest first.
    fn prescriptions_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientPrescription>>;
}

/// SQLite-backed prescription repository.
pub struct SqlitePrescriptionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePrescriptionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PrescriptionRepository for SqlitePrescriptionRepository<'_> {
    fn prescriptions_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientPrescription>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.prescription_id,
                p.registration_id,
                p.quantity,
                p.dosage,
                p.duration_days,
                p.notes,
                p.created_at,
                d.drug_name,
                d.specification,
                d.unit_price,
                (d.unit_price * p.quantity) AS total_cost,
                r.registration_date
             FROM prescription p
             JOIN drug d ON p.drug_id = d.drug_id
             JOIN registration r ON p.registration_id = r.registration_id
             WHERE r.patient_id = ?1
             ORDER BY p.created_at DESC, p.prescription_id DESC;",
        )?;
        let mut rows = stmt.query([patient_id])?;
        let mut prescriptions = Vec::new();
        while let Some(row) = rows.next()? {
            prescriptions.push(PatientPrescription {
                prescription_id: row.get("prescription_id")?,
                registration_id: row.get("registration_id")?,
                quantity: row.get("quantity")?,
                dosage: row.get("dosage")?,
                duration_days: row.get("duration_days")?,
                notes: row.get("notes")?,
                created_at: row.get("created_at")?,
                drug_name: row.get("drug_name")?,
                specification: row.get("specification")?,
                unit_price: row.get("unit_price")?,
                total_cost: row.get("total_cost")?,
                registration_date: row.get("registration_date")?,
            });
        }
        Ok(prescriptions)
    }
}
