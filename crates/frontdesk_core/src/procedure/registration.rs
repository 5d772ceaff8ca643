//! `sp_submit_registration`: open a registration and its fee bill.

use super::{ProcedureContext, StoredProcedure};
use crate::db::{signal, DbResult, SignalCode};
use crate::model::validation::non_blank;
use crate::model::{registration_fee, PaymentType, RegistrationStatus};
use rusqlite::{params, OptionalExtension};

/// Registers a patient with a doctor; OUT is the new `registration_id`.
///
/// Emits one result set with the pending registration payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRegistration {
    pub patient_id: i64,
    pub department_id: i64,
    pub doctor_id: i64,
    pub payment_method: Option<String>,
    pub chief_complaint: Option<String>,
}

impl StoredProcedure for SubmitRegistration {
    const NAME: &'static str = "sp_submit_registration";
    type Output = i64;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<i64> {
        let conn = ctx.conn();

        let patient_exists = conn
            .query_row(
                "SELECT 1 FROM patient WHERE patient_id = ?1;",
                [self.patient_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !patient_exists {
            return Err(signal(
                SignalCode::InvalidReference,
                format!("Patient {} does not exist", self.patient_id),
            ));
        }

        let department_exists = conn
            .query_row(
                "SELECT 1 FROM department WHERE department_id = ?1;",
                [self.department_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !department_exists {
            return Err(signal(
                SignalCode::InvalidReference,
                format!("Department {} does not exist", self.department_id),
            ));
        }

        let doctor = conn
            .query_row(
                "SELECT department_id, title FROM doctor WHERE doctor_id = ?1;",
                [self.doctor_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((doctor_department, title)) = doctor else {
            return Err(signal(
                SignalCode::InvalidReference,
                format!("Doctor {} does not exist", self.doctor_id),
            ));
        };
        if doctor_department != self.department_id {
            return Err(signal(
                SignalCode::InvalidReference,
                format!(
                    "Doctor {} does not belong to department {}",
                    self.doctor_id, self.department_id
                ),
            ));
        }

        let fee = registration_fee(&title);
        // registration_date is explicit so the duplicate trigger sees it.
        conn.execute(
            "INSERT INTO registration (
                patient_id,
                department_id,
                doctor_id,
                registration_date,
                registration_time,
                chief_complaint,
                status,
                fee
            ) VALUES (?1, ?2, ?3, date('now', 'localtime'), time('now', 'localtime'), ?4, ?5, ?6);",
            params![
                self.patient_id,
                self.department_id,
                self.doctor_id,
                non_blank(self.chief_complaint.as_deref()),
                RegistrationStatus::Unpaid.to_db(),
                fee,
            ],
        )?;
        let registration_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO payment (registration_id, payment_type, amount, payment_method)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                registration_id,
                PaymentType::Registration.to_db(),
                fee,
                non_blank(self.payment_method.as_deref()),
            ],
        )?;

        ctx.emit_result_set(
            "SELECT payment_id, amount, payment_status
             FROM payment
             WHERE registration_id = ?1 AND payment_type = 'Registration' AND payment_status = 0;",
            [registration_id],
        )?;

        Ok(registration_id)
    }
}
