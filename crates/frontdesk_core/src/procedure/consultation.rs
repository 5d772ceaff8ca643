//! `sp_create_prescription` and `sp_finish_consultation`.
//!
//! # Invariants
//! - Every prescription line gets exactly one unpaid Medicine payment of
//!   `unit_price * quantity`.
//! - Finishing a consultation is all-or-nothing across its lines.
//! - Stock is checked against the summed quantity per drug, but only
//!   decremented when the Medicine payment is paid.

use super::{ProcedureContext, StoredProcedure};
use crate::db::{signal, DbError, DbResult, SignalCode};
use crate::model::validation::non_blank;
use crate::model::{PaymentType, PrescriptionItem, RegistrationStatus};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Adds one prescription line; OUT is the new Medicine `payment_id`.
///
/// Performs no stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrescription {
    pub registration_id: i64,
    pub item: PrescriptionItem,
    pub payment_method: Option<String>,
}

impl StoredProcedure for CreatePrescription {
    const NAME: &'static str = "sp_create_prescription";
    type Output = i64;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<i64> {
        let conn = ctx.conn();
        if registration_status(conn, self.registration_id)?.is_none() {
            return Err(missing_registration(self.registration_id));
        }
        let (_, payment_id) = insert_prescription(
            conn,
            self.registration_id,
            &self.item,
            self.payment_method.as_deref(),
        )?;
        Ok(payment_id)
    }
}

/// Records all prescription lines of a consultation and completes the
/// registration; OUT is the list of created Medicine `payment_id`s in line
/// order.
///
/// Emits one result set with the prescriptions of the registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishConsultation {
    pub registration_id: i64,
    pub items: Vec<PrescriptionItem>,
    pub payment_method: Option<String>,
}

impl StoredProcedure for FinishConsultation {
    const NAME: &'static str = "sp_finish_consultation";
    type Output = Vec<i64>;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<Vec<i64>> {
        let conn = ctx.conn();

        let status = registration_status(conn, self.registration_id)?
            .ok_or_else(|| missing_registration(self.registration_id))?;
        if status != Some(RegistrationStatus::AwaitingConsultation) {
            let label = status.map_or("Unknown", RegistrationStatus::label);
            return Err(signal(
                SignalCode::InvalidRegistrationState,
                format!(
                    "Registration {} is not awaiting consultation (status: {label})",
                    self.registration_id
                ),
            ));
        }

        // `None` marks a per-drug total that overflowed.
        let mut requested: BTreeMap<i64, Option<i64>> = BTreeMap::new();
        for item in &self.items {
            let total = requested.entry(item.drug_id).or_insert(Some(0));
            *total = total.and_then(|sum| sum.checked_add(item.quantity));
        }
        for (drug_id, quantity) in &requested {
            let drug = conn
                .query_row(
                    "SELECT drug_name, stored_quantity FROM drug WHERE drug_id = ?1;",
                    [drug_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            let Some((drug_name, stored_quantity)) = drug else {
                return Err(missing_drug(*drug_id));
            };
            let covered = quantity.is_some_and(|quantity| stored_quantity >= quantity);
            if !covered {
                let quantity = quantity.map_or_else(|| "too many".to_string(), |q| q.to_string());
                return Err(signal(
                    SignalCode::InsufficientStock,
                    format!(
                        "Insufficient stock for drug \"{drug_name}\": requested {quantity}, available {stored_quantity}"
                    ),
                ));
            }
        }

        let mut payment_ids = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let (_, payment_id) = insert_prescription(
                conn,
                self.registration_id,
                item,
                self.payment_method.as_deref(),
            )?;
            payment_ids.push(payment_id);
        }

        conn.execute(
            "UPDATE registration SET status = ?1 WHERE registration_id = ?2;",
            params![RegistrationStatus::Completed.to_db(), self.registration_id],
        )?;

        ctx.emit_result_set(
            "SELECT p.prescription_id, p.drug_id, d.drug_name, p.quantity, p.dosage, p.duration_days
             FROM prescription p
             JOIN drug d ON d.drug_id = p.drug_id
             WHERE p.registration_id = ?1
             ORDER BY p.prescription_id ASC;",
            [self.registration_id],
        )?;

        Ok(payment_ids)
    }
}

/// Returns `None` when the registration does not exist, `Some(None)` when
/// its stored status is not a known code.
fn registration_status(
    conn: &Connection,
    registration_id: i64,
) -> DbResult<Option<Option<RegistrationStatus>>> {
    let status = conn
        .query_row(
            "SELECT status FROM registration WHERE registration_id = ?1;",
            [registration_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(status.map(RegistrationStatus::from_db))
}

fn insert_prescription(
    conn: &Connection,
    registration_id: i64,
    item: &PrescriptionItem,
    payment_method: Option<&str>,
) -> DbResult<(i64, i64)> {
    let unit_price = conn
        .query_row(
            "SELECT unit_price FROM drug WHERE drug_id = ?1;",
            [item.drug_id],
            |row| row.get::<_, f64>(0),
        )
        .optional()?
        .ok_or_else(|| missing_drug(item.drug_id))?;

    conn.execute(
        "INSERT INTO prescription (registration_id, drug_id, quantity, dosage, duration_days, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            registration_id,
            item.drug_id,
            item.quantity,
            item.dosage.trim(),
            item.duration_days,
            item.notes.trim(),
        ],
    )?;
    let prescription_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO payment (registration_id, prescription_id, payment_type, amount, payment_method)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            registration_id,
            prescription_id,
            PaymentType::Medicine.to_db(),
            unit_price * item.quantity as f64,
            non_blank(payment_method),
        ],
    )?;

    Ok((prescription_id, conn.last_insert_rowid()))
}

fn missing_registration(registration_id: i64) -> DbError {
    signal(
        SignalCode::InvalidReference,
        format!("Registration {registration_id} does not exist"),
    )
}

fn missing_drug(drug_id: i64) -> DbError {
    signal(
        SignalCode::InvalidReference,
        format!("Drug {drug_id} does not exist"),
    )
}
