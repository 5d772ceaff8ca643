//! Stored-procedure call wrapper and the procedures it runs.
//!
//! # Responsibility
//! - Run one named procedure inside one immediate transaction.
//! - Hand back the procedure's OUT values together with every non-empty
//!   result set it emitted.
//! - Commit on success; roll back and re-raise on any error.
//!
//! # Invariants
//! - A procedure body never commits or rolls back by itself.
//! - Errors leaving `call_procedure` are already classified, so business
//!   rule violations surface as `DbError::Signal`.
//! - Empty result sets are dropped.

use crate::db::DbResult;
use log::{error, info, warn};
use rusqlite::types::Value;
use rusqlite::{Connection, Params, Transaction, TransactionBehavior};
use std::time::Instant;

mod consultation;
mod patient;
mod payment;
mod registration;

pub use consultation::{CreatePrescription, FinishConsultation};
pub use patient::AddPatient;
pub use payment::PayBill;
pub use registration::SubmitRegistration;

/// Rows produced by one `SELECT` executed inside a procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Values returned by `call_procedure`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureOutput<T> {
    /// OUT parameters of the procedure.
    pub out: T,
    /// Non-empty result sets in emission order.
    pub result_sets: Vec<ResultSet>,
}

/// Execution context handed to a procedure body.
pub struct ProcedureContext<'a> {
    conn: &'a Connection,
    result_sets: Vec<ResultSet>,
}

impl<'a> ProcedureContext<'a> {
    /// Connection bound to the procedure's transaction.
    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    /// Runs a query and records its rows as a result set.
    pub fn emit_result_set(&mut self, sql: &str, params: impl Params) -> DbResult<()> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = columns.len();

        let mut rows = stmt.query(params)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(row.get::<_, Value>(index)?);
            }
            collected.push(values);
        }

        if !collected.is_empty() {
            self.result_sets.push(ResultSet {
                columns,
                rows: collected,
            });
        }
        Ok(())
    }
}

/// A named unit of transactional business logic.
pub trait StoredProcedure {
    /// Procedure name used in logs.
    const NAME: &'static str;
    /// OUT parameters.
    type Output;

    fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<Self::Output>;
}

/// Runs `procedure` atomically and returns its OUT values and result sets.
///
/// # Errors
/// - `DbError::Signal` when a trigger or the procedure raised a known code.
/// - `DbError::Sqlite` for every other database failure.
pub fn call_procedure<P: StoredProcedure>(
    conn: &Connection,
    procedure: &P,
) -> DbResult<ProcedureOutput<P::Output>> {
    let started_at = Instant::now();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let mut ctx = ProcedureContext {
        conn: &tx,
        result_sets: Vec::new(),
    };
    let outcome = procedure.execute(&mut ctx);
    let ProcedureContext { result_sets, .. } = ctx;

    match outcome {
        Ok(out) => {
            if let Err(err) = tx.commit() {
                error!(
                    "event=procedure_call module=procedure status=error procedure={} duration_ms={} error_code=commit_failed error={}",
                    P::NAME,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
            info!(
                "event=procedure_call module=procedure status=ok procedure={} duration_ms={} result_sets={}",
                P::NAME,
                started_at.elapsed().as_millis(),
                result_sets.len()
            );
            Ok(ProcedureOutput { out, result_sets })
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=procedure_rollback module=procedure status=error procedure={} error={}",
                    P::NAME,
                    rollback_err
                );
            }
            match err.as_signal() {
                Some(signal) => info!(
                    "event=procedure_call module=procedure status=rejected procedure={} duration_ms={} signal_code={}",
                    P::NAME,
                    started_at.elapsed().as_millis(),
                    signal.code.code()
                ),
                None => error!(
                    "event=procedure_call module=procedure status=error procedure={} duration_ms={} error_code=procedure_failed error={}",
                    P::NAME,
                    started_at.elapsed().as_millis(),
                    err
                ),
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{call_procedure, ProcedureContext, StoredProcedure};
    use crate::db::{open_db_in_memory, signal, DbError, DbResult, SignalCode};

    struct InsertThenFail;

    impl StoredProcedure for InsertThenFail {
        const NAME: &'static str = "test_insert_then_fail";
        type Output = ();

        fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<()> {
            ctx.conn()
                .execute("INSERT INTO department (department_name) VALUES ('Ghost');", [])?;
            Err(signal(SignalCode::InvalidReference, "abort on purpose"))
        }
    }

    struct ListDepartments;

    impl StoredProcedure for ListDepartments {
        const NAME: &'static str = "test_list_departments";
        type Output = i64;

        fn execute(&self, ctx: &mut ProcedureContext<'_>) -> DbResult<i64> {
            ctx.conn().execute(
                "INSERT INTO department (department_name) VALUES ('Cardiology');",
                [],
            )?;
            ctx.emit_result_set("SELECT department_id, department_name FROM department;", [])?;
            ctx.emit_result_set("SELECT * FROM department WHERE 1 = 0;", [])?;
            Ok(ctx.conn().last_insert_rowid())
        }
    }

    #[test]
    fn failed_procedure_rolls_back_and_keeps_signal() {
        let conn = open_db_in_memory().unwrap();
        let err = call_procedure(&conn, &InsertThenFail).unwrap_err();
        assert!(matches!(
            err,
            DbError::Signal(ref s) if s.code == SignalCode::InvalidReference
        ));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM department;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn successful_procedure_returns_out_value_and_non_empty_result_sets() {
        let conn = open_db_in_memory().unwrap();
        let output = call_procedure(&conn, &ListDepartments).unwrap();

        assert_eq!(output.result_sets.len(), 1);
        let set = &output.result_sets[0];
        assert_eq!(set.columns, vec!["department_id", "department_name"]);
        assert_eq!(
            set.value(0, "department_id"),
            Some(&rusqlite::types::Value::Integer(output.out))
        );
    }
}
