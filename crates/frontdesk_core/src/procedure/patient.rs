//! `sp_add_patient`: insert one patient record.

use super::{ProcedureContext, StoredProcedure};
use crate::db::DbResult;
use crate::model::validation::non_blank;
use crate::model::NewPatient;
use rusqlite::params;

/// Inserts a patient; OUT is the new `patient_id`.
///
/// Input must already be validated by the caller.
#[derive(Debug, Clone)]
pub struct AddPatient<'a> {
    pub patient: &'a NewPatient,
}

impl StoredProcedure for AddPatient<'_> {
    const NAME: &'static str = "sp_add_patient";
    type Output = i64;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<i64> {
        let patient = self.patient;
        ctx.conn().execute(
            "INSERT INTO patient (patient_name, gender, date_of_birth, phone, address, id_card)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                patient.patient_name.trim(),
                patient.gender.trim(),
                patient.date_of_birth.trim(),
                patient.phone.trim(),
                non_blank(patient.address.as_deref()),
                patient.id_card.trim(),
            ],
        )?;
        Ok(ctx.conn().last_insert_rowid())
    }
}
