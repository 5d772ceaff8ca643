//! Billing use-case service.
//!
//! # Responsibility
//! - List a patient's unpaid bills.
//! - Pay one bill through `sp_pay_bill` and translate stock shortfalls into
//!   a structured outcome naming the drug.

use super::ServiceResult;
use crate::db::{DbError, SignalCode};
use crate::model::PendingPayment;
use crate::procedure::{call_procedure, PayBill};
use crate::repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
use rusqlite::Connection;

/// Drug name reported when a shortfall message names no drug.
pub const UNKNOWN_DRUG_NAME: &str = "Unknown";

/// Result of a pay-bill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    /// Payment does not exist or was already paid.
    NotPayable { payment_id: i64 },
    /// Stock no longer covers the prescribed quantity.
    InventoryShortfall { drug_name: String, message: String },
}

impl PaymentOutcome {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }

    pub fn message(&self) -> String {
        match self {
            Self::Paid => "Payment processed successfully".to_string(),
            Self::NotPayable { payment_id } => {
                format!("Payment ID {payment_id} does not exist or has already been paid")
            }
            Self::InventoryShortfall { message, .. } => message.clone(),
        }
    }
}

/// Use-case service for the billing center.
pub struct BillingService<'conn> {
    conn: &'conn Connection,
    payments: SqlitePaymentRepository<'conn>,
}

impl<'conn> BillingService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            payments: SqlitePaymentRepository::new(conn),
        }
    }

    pub fn pending_payments(&self, patient_id: i64) -> ServiceResult<Vec<PendingPayment>> {
        Ok(self.payments.pending_for_patient(patient_id)?)
    }

    /// Marks a bill as paid.
    ///
    /// Paying a Medicine bill decrements stock; paying a Registration bill
    /// moves the registration into the doctor's queue.
    pub fn pay_bill(&self, payment_id: i64) -> ServiceResult<PaymentOutcome> {
        match call_procedure(self.conn, &PayBill { payment_id }) {
            Ok(output) if output.out == 0 => Ok(PaymentOutcome::NotPayable { payment_id }),
            Ok(_) => Ok(PaymentOutcome::Paid),
            Err(DbError::Signal(signal)) if signal.code == SignalCode::InsufficientStock => {
                Ok(PaymentOutcome::InventoryShortfall {
                    drug_name: quoted_drug_name(&signal.message)
                        .unwrap_or(UNKNOWN_DRUG_NAME)
                        .to_string(),
                    message: signal.message,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Extracts the first double-quoted segment of a shortfall message.
fn quoted_drug_name(message: &str) -> Option<&str> {
    let start = message.find('"')? + 1;
    let len = message[start..].find('"')?;
    Some(&message[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::quoted_drug_name;

    #[test]
    fn quoted_drug_name_reads_first_quoted_segment() {
        assert_eq!(
            quoted_drug_name("Insufficient stock for drug \"Ibuprofen\": requested 3"),
            Some("Ibuprofen")
        );
        assert_eq!(quoted_drug_name("Insufficient stock for prescribed drug"), None);
        assert_eq!(quoted_drug_name("unterminated \"quote"), None);
    }
}
