//! Department repository contracts and SQLite implementation.

use super::{count_where, RepoError, RepoResult};
use crate::model::validation::non_blank;
use crate::model::{Department, NewDepartment};
use rusqlite::{params, Connection, Row};

const DEPARTMENT_SELECT_SQL: &str = "SELECT
    department_id,
    department_name,
    description,
    location,
    phone,
    created_at
FROM department";

/// Repository interface for department maintenance.
pub trait DepartmentRepository {
    /// Lists departments in id order, as offered on the registration form.
    fn list_departments(&self) -> RepoResult<Vec<Department>>;
    /// Lists departments newest first, as shown on the admin page.
    fn list_departments_newest_first(&self) -> RepoResult<Vec<Department>>;
    fn department_exists(&self, department_id: i64) -> RepoResult<bool>;
    fn create_department(&self, department: &NewDepartment) -> RepoResult<i64>;
    fn count_doctors(&self, department_id: i64) -> RepoResult<i64>;
    fn delete_department(&self, department_id: i64) -> RepoResult<()>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_all(&self, order_by: &str) -> RepoResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEPARTMENT_SELECT_SQL} ORDER BY {order_by};"))?;
        let mut rows = stmt.query([])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(parse_department_row(row)?);
        }
        Ok(departments)
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        self.query_all("department_id ASC")
    }

    fn list_departments_newest_first(&self) -> RepoResult<Vec<Department>> {
        self.query_all("department_id DESC")
    }

    fn department_exists(&self, department_id: i64) -> RepoResult<bool> {
        let count = count_where(
            self.conn,
            "SELECT COUNT(*) FROM department WHERE department_id = ?1;",
            department_id,
        )?;
        Ok(count > 0)
    }

    fn create_department(&self, department: &NewDepartment) -> RepoResult<i64> {
        department.validate()?;

        self.conn.execute(
            "INSERT INTO department (department_name, description, location, phone)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                department.department_name.trim(),
                non_blank(department.description.as_deref()),
                non_blank(department.location.as_deref()),
                non_blank(department.phone.as_deref()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_doctors(&self, department_id: i64) -> RepoResult<i64> {
        count_where(
            self.conn,
            "SELECT COUNT(*) FROM doctor WHERE department_id = ?1;",
            department_id,
        )
    }

    fn delete_department(&self, department_id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM department WHERE department_id = ?1;",
            [department_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "department",
                id: department_id,
            });
        }
        Ok(())
    }
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    Ok(Department {
        department_id: row.get("department_id")?,
        department_name: row.get("department_name")?,
        description: row.get("description")?,
        location: row.get("location")?,
        phone: row.get("phone")?,
        created_at: row.get("created_at")?,
    })
}
