//! `sp_pay_bill`: mark one bill as paid.
//!
//! Stock decrement and registration status changes are performed by the
//! payment triggers; this procedure only adds a named shortfall check in
//! front of the stock guard trigger.

use super::{ProcedureContext, StoredProcedure};
use crate::db::{signal, DbResult, SignalCode};
use crate::model::{PaymentStatus, PaymentType};
use rusqlite::{params, OptionalExtension};

/// Pays one bill; OUT is the number of payments updated (0 or 1).
///
/// Unknown or already-paid payments yield `0` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayBill {
    pub payment_id: i64,
}

impl StoredProcedure for PayBill {
    const NAME: &'static str = "sp_pay_bill";
    type Output = usize;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<usize> {
        let conn = ctx.conn();

        let payment = conn
            .query_row(
                "SELECT payment_type, payment_status, prescription_id
                 FROM payment
                 WHERE payment_id = ?1;",
                [self.payment_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((payment_type, payment_status, prescription_id)) = payment else {
            return Ok(0);
        };
        if payment_status != PaymentStatus::Unpaid.to_db() {
            return Ok(0);
        }

        if PaymentType::from_db(&payment_type) == Some(PaymentType::Medicine) {
            let shortfall = conn
                .query_row(
                    "SELECT d.drug_name, d.stored_quantity, p.quantity
                     FROM prescription p
                     JOIN drug d ON d.drug_id = p.drug_id
                     WHERE p.prescription_id = ?1
                       AND d.stored_quantity < p.quantity;",
                    [prescription_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()?;
            if let Some((drug_name, stored_quantity, quantity)) = shortfall {
                return Err(signal(
                    SignalCode::InsufficientStock,
                    format!(
                        "Insufficient stock for drug \"{drug_name}\": requested {quantity}, available {stored_quantity}"
                    ),
                ));
            }
        }

        let changed = conn.execute(
            "UPDATE payment
             SET payment_status = ?1, payment_date = datetime('now', 'localtime')
             WHERE payment_id = ?2 AND payment_status = ?3;",
            params![
                PaymentStatus::Paid.to_db(),
                self.payment_id,
                PaymentStatus::Unpaid.to_db(),
            ],
        )?;
        Ok(changed)
    }
}
