//! Directory records: departments, doctors, patients and drugs.
//!
//! # Responsibility
//! - Define the persisted shape of admin-maintained entities.
//! - Validate admin input before it reaches SQL.
//!
//! # Invariants
//! - `id_card` and `drug_code` are unique in storage; validation only
//!   checks presence.
//! - Monetary values are stored as SQLite `REAL`.

use super::validation::{non_blank, require_date, require_text, ValidationError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Department {
    pub department_id: i64,
    pub department_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub gender: String,
    pub title: String,
    pub department_id: i64,
    pub phone: String,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub created_at: String,
}

/// Doctor joined with its department name, as shown on the admin page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorSummary {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub department_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub patient_id: i64,
    pub patient_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub phone: String,
    pub address: Option<String>,
    pub id_card: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drug {
    pub drug_id: i64,
    pub drug_name: String,
    pub drug_code: String,
    pub specification: String,
    pub manufacturer: String,
    pub unit_price: f64,
    pub stored_quantity: i64,
    pub expiry_date: Option<String>,
    pub created_at: String,
}

/// Inventory monitoring row for drugs below a stock threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockDrug {
    pub drug_id: i64,
    pub drug_name: String,
    pub drug_code: String,
    pub specification: String,
    pub unit_price: f64,
    pub stored_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDepartment {
    pub department_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

impl NewDepartment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.department_name, "department_name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoctor {
    pub doctor_name: String,
    pub gender: String,
    pub title: String,
    pub department_id: i64,
    pub phone: String,
    pub email: Option<String>,
    pub specialization: Option<String>,
}

impl NewDoctor {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.doctor_name, "doctor_name")?;
        require_text(&self.gender, "gender")?;
        require_text(&self.title, "title")?;
        require_text(&self.phone, "phone")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub patient_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub phone: String,
    pub address: Option<String>,
    pub id_card: String,
}

impl NewPatient {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.patient_name, "patient_name")?;
        require_text(&self.gender, "gender")?;
        require_date(&self.date_of_birth, "date_of_birth")?;
        require_text(&self.phone, "phone")?;
        require_text(&self.id_card, "id_card")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDrug {
    pub drug_name: String,
    pub drug_code: String,
    pub specification: String,
    pub manufacturer: String,
    pub unit_price: f64,
    pub stored_quantity: i64,
    pub expiry_date: Option<String>,
}

impl NewDrug {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.drug_name, "drug_name")?;
        require_text(&self.drug_code, "drug_code")?;
        require_text(&self.specification, "specification")?;
        require_text(&self.manufacturer, "manufacturer")?;
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(ValidationError::NegativeValue("unit_price"));
        }
        if self.stored_quantity < 0 {
            return Err(ValidationError::NegativeValue("stored_quantity"));
        }
        if let Some(expiry) = non_blank(self.expiry_date.as_deref()) {
            require_date(expiry, "expiry_date")?;
        }
        Ok(())
    }
}
