//! Payment read models for the billing center and patient portal.

use super::{RepoError, RepoResult};
use crate::model::{PatientPayment, PaymentStatus, PaymentType, PendingPayment};
use rusqlite::{Connection, OptionalExtension, Row};

/// Repository interface for payment queries.
pub trait PaymentRepository {
    /// Amount of the unpaid registration fee for a registration.
    fn pending_registration_amount(&self, registration_id: i64) -> RepoResult<Option<f64>>;
    /// Unpaid bills of a patient, oldest first.
    fn pending_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PendingPayment>>;
    /// Every bill of a patient, newest first.
    fn payments_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientPayment>>;
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PaymentRepository for SqlitePaymentRepository<'_> {
    fn pending_registration_amount(&self, registration_id: i64) -> RepoResult<Option<f64>> {
        let amount = self
            .conn
            .query_row(
                "SELECT amount
                 FROM payment
                 WHERE registration_id = ?1
                   AND payment_type = 'Registration'
                   AND payment_status = 0
                 ORDER BY payment_id ASC
                 LIMIT 1;",
                [registration_id],
                |row| row.get::<_, f64>(0),
            )
            .optional()?;
        Ok(amount)
    }

    fn pending_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PendingPayment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.payment_id,
                p.registration_id,
                p.payment_type,
                p.amount,
                p.payment_method,
                p.payment_status,
                r.registration_date,
                r.doctor_id,
                d.doctor_name
             FROM payment p
             JOIN registration r ON p.registration_id = r.registration_id
             LEFT JOIN doctor d ON r.doctor_id = d.doctor_id
             WHERE r.patient_id = ?1 AND p.payment_status = 0
             ORDER BY p.created_at ASC, p.payment_id ASC;",
        )?;
        let mut rows = stmt.query([patient_id])?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next()? {
            payments.push(PendingPayment {
                payment_id: row.get("payment_id")?,
                registration_id: row.get("registration_id")?,
                payment_type: parse_payment_type(row)?,
                amount: row.get("amount")?,
                payment_method: row.get("payment_method")?,
                payment_status: parse_payment_status(row)?,
                registration_date: row.get("registration_date")?,
                doctor_id: row.get("doctor_id")?,
                doctor_name: row.get("doctor_name")?,
            });
        }
        Ok(payments)
    }

    fn payments_for_patient(&self, patient_id: i64) -> RepoResult<Vec<PatientPayment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.payment_id,
                p.registration_id,
                p.payment_type,
                p.amount,
                p.payment_method,
                p.payment_status,
                p.payment_date,
                p.created_at,
                r.registration_date
             FROM payment p
             JOIN registration r ON p.registration_id = r.registration_id
             WHERE r.patient_id = ?1
             ORDER BY p.created_at DESC, p.payment_id DESC;",
        )?;
        let mut rows = stmt.query([patient_id])?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next()? {
            let payment_status = parse_payment_status(row)?;
            payments.push(PatientPayment {
                payment_id: row.get("payment_id")?,
                registration_id: row.get("registration_id")?,
                payment_type: parse_payment_type(row)?,
                amount: row.get("amount")?,
                payment_method: row.get("payment_method")?,
                payment_status,
                payment_status_text: payment_status.label(),
                payment_date: row.get("payment_date")?,
                created_at: row.get("created_at")?,
                registration_date: row.get("registration_date")?,
            });
        }
        Ok(payments)
    }
}

fn parse_payment_type(row: &Row<'_>) -> RepoResult<PaymentType> {
    let value: String = row.get("payment_type")?;
    PaymentType::from_db(&value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid payment type `{value}` in payment.payment_type"))
    })
}

fn parse_payment_status(row: &Row<'_>) -> RepoResult<PaymentStatus> {
    let value: i64 = row.get("payment_status")?;
    PaymentStatus::from_db(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid payment status `{value}` in payment.payment_status"
        ))
    })
}
