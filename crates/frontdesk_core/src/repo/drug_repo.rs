//! Drug repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Stock is never written here after creation; it only moves through the
//!   payment triggers.

use super::{count_where, RepoError, RepoResult};
use crate::model::validation::non_blank;
use crate::model::{Drug, LowStockDrug, NewDrug};
use rusqlite::{params, Connection, Row};

const DRUG_SELECT_SQL: &str = "SELECT
    drug_id,
    drug_name,
    drug_code,
    specification,
    manufacturer,
    unit_price,
    stored_quantity,
    expiry_date,
    created_at
FROM drug";

/// Repository interface for drug maintenance and inventory queries.
pub trait DrugRepository {
    /// Drugs with stock left, in name order, for the prescription form.
    fn list_in_stock(&self) -> RepoResult<Vec<Drug>>;
    /// Drugs strictly below `threshold`, lowest stock first.
    fn list_low_stock(&self, threshold: i64) -> RepoResult<Vec<LowStockDrug>>;
    /// Lists drugs newest first.
    fn list_drugs(&self) -> RepoResult<Vec<Drug>>;
    fn create_drug(&self, drug: &NewDrug) -> RepoResult<i64>;
    fn count_prescriptions(&self, drug_id: i64) -> RepoResult<i64>;
    fn delete_drug(&self, drug_id: i64) -> RepoResult<()>;
}

/// SQLite-backed drug repository.
pub struct SqliteDrugRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDrugRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_drugs(&self, tail: &str) -> RepoResult<Vec<Drug>> {
        let mut stmt = self.conn.prepare(&format!("{DRUG_SELECT_SQL} {tail};"))?;
        let mut rows = stmt.query([])?;
        let mut drugs = Vec::new();
        while let Some(row) = rows.next()? {
            drugs.push(parse_drug_row(row)?);
        }
        Ok(drugs)
    }
}

impl DrugRepository for SqliteDrugRepository<'_> {
    fn list_in_stock(&self) -> RepoResult<Vec<Drug>> {
        self.query_drugs("WHERE stored_quantity > 0 ORDER BY drug_name ASC, drug_id ASC")
    }

    fn list_low_stock(&self, threshold: i64) -> RepoResult<Vec<LowStockDrug>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                drug_id,
                drug_name,
                drug_code,
                specification,
                unit_price,
                stored_quantity
             FROM drug
             WHERE stored_quantity < ?1
             ORDER BY stored_quantity ASC, drug_id ASC;",
        )?;
        let mut rows = stmt.query([threshold])?;
        let mut drugs = Vec::new();
        while let Some(row) = rows.next()? {
            drugs.push(LowStockDrug {
                drug_id: row.get("drug_id")?,
                drug_name: row.get("drug_name")?,
                drug_code: row.get("drug_code")?,
                specification: row.get("specification")?,
                unit_price: row.get("unit_price")?,
                stored_quantity: row.get("stored_quantity")?,
            });
        }
        Ok(drugs)
    }

    fn list_drugs(&self) -> RepoResult<Vec<Drug>> {
        self.query_drugs("ORDER BY drug_id DESC")
    }

    fn create_drug(&self, drug: &NewDrug) -> RepoResult<i64> {
        drug.validate()?;

        self.conn.execute(
            "INSERT INTO drug (
                drug_name,
                drug_code,
                specification,
                manufacturer,
                unit_price,
                stored_quantity,
                expiry_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                drug.drug_name.trim(),
                drug.drug_code.trim(),
                drug.specification.trim(),
                drug.manufacturer.trim(),
                drug.unit_price,
                drug.stored_quantity,
                non_blank(drug.expiry_date.as_deref()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_prescriptions(&self, drug_id: i64) -> RepoResult<i64> {
        count_where(
            self.conn,
            "SELECT COUNT(*) FROM prescription WHERE drug_id = ?1;",
            drug_id,
        )
    }

    fn delete_drug(&self, drug_id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM drug WHERE drug_id = ?1;", [drug_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "drug",
                id: drug_id,
            });
        }
        Ok(())
    }
}

fn parse_drug_row(row: &Row<'_>) -> RepoResult<Drug> {
    Ok(Drug {
        drug_id: row.get("drug_id")?,
        drug_name: row.get("drug_name")?,
        drug_code: row.get("drug_code")?,
        specification: row.get("specification")?,
        manufacturer: row.get("manufacturer")?,
        unit_price: row.get("unit_price")?,
        stored_quantity: row.get("stored_quantity")?,
        expiry_date: row.get("expiry_date")?,
        created_at: row.get("created_at")?,
    })
}
