//! Registration lifecycle and consultation records.
//!
//! # Invariants
//! - Status only moves forward: `Unpaid -> AwaitingConsultation -> Completed`.
//! - `Unpaid -> AwaitingConsultation` is driven by paying the registration
//!   fee; `AwaitingConsultation -> Completed` by finishing the consultation.

use super::validation::{require_text, ValidationError};
use serde::Serialize;

/// Dosage used when the doctor leaves the dosage field empty.
pub const DEFAULT_DOSAGE: &str = "As directed";
pub const DEFAULT_DURATION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registration fee not paid yet.
    Unpaid,
    /// Fee paid; patient is in the doctor's queue.
    AwaitingConsultation,
    /// Consultation finished.
    Completed,
}

impl RegistrationStatus {
    pub fn to_db(self) -> i64 {
        match self {
            Self::Unpaid => 0,
            Self::AwaitingConsultation => 1,
            Self::Completed => 2,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unpaid),
            1 => Some(Self::AwaitingConsultation),
            2 => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::AwaitingConsultation => "Awaiting consultation",
            Self::Completed => "Completed",
        }
    }
}

/// Registration fee charged for a doctor's title.
///
/// Both English and Chinese title spellings are recognized.
pub fn registration_fee(title: &str) -> f64 {
    match title.trim() {
        "Chief Physician" | "主任医师" => 50.0,
        "Associate Chief Physician" | "副主任医师" => 30.0,
        "Attending Physician" | "主治医师" => 20.0,
        _ => 15.0,
    }
}

/// Row in a doctor's consultation queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitingPatient {
    pub registration_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub gender: String,
    pub phone: String,
    pub registration_date: String,
    pub registration_time: String,
    pub chief_complaint: Option<String>,
    pub status: RegistrationStatus,
}

/// Header information shown on the diagnosis page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisSubject {
    pub registration_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub phone: String,
    pub registration_date: String,
    pub registration_time: String,
    pub chief_complaint: Option<String>,
    pub department_name: String,
    pub doctor_name: Option<String>,
    pub status: RegistrationStatus,
}

/// Registration history row for the patient portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRegistration {
    pub registration_id: i64,
    pub registration_date: String,
    pub registration_time: String,
    pub status: RegistrationStatus,
    pub status_text: &'static str,
    pub fee: f64,
    pub chief_complaint: Option<String>,
    pub department_name: String,
    pub doctor_name: Option<String>,
}

/// One prescribed drug line submitted by a doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionItem {
    pub drug_id: i64,
    pub quantity: i64,
    pub dosage: String,
    pub duration_days: i64,
    pub notes: String,
}

impl PrescriptionItem {
    /// Creates a line with default dosage, duration and empty notes.
    pub fn new(drug_id: i64, quantity: i64) -> Self {
        Self {
            drug_id,
            quantity,
            dosage: DEFAULT_DOSAGE.to_string(),
            duration_days: DEFAULT_DURATION_DAYS,
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= 0 {
            return Err(ValidationError::NonPositiveValue("quantity"));
        }
        if self.duration_days <= 0 {
            return Err(ValidationError::NonPositiveValue("duration_days"));
        }
        require_text(&self.dosage, "dosage")
    }
}

/// Prescription history row for the patient portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientPrescription {
    pub prescription_id: i64,
    pub registration_id: i64,
    pub quantity: i64,
    pub dosage: String,
    pub duration_days: i64,
    pub notes: String,
    pub created_at: String,
    pub drug_name: String,
    pub specification: String,
    pub unit_price: f64,
    pub total_cost: f64,
    pub registration_date: String,
}

#[cfg(test)]
mod tests {
    use super::{registration_fee, PrescriptionItem, RegistrationStatus};
    use crate::model::ValidationError;

    #[test]
    fn status_codes_roundtrip_and_reject_unknown_values() {
        for status in [
            RegistrationStatus::Unpaid,
            RegistrationStatus::AwaitingConsultation,
            RegistrationStatus::Completed,
        ] {
            assert_eq!(RegistrationStatus::from_db(status.to_db()), Some(status));
        }
        assert_eq!(RegistrationStatus::from_db(7), None);
    }

    #[test]
    fn fee_depends_on_title() {
        assert_eq!(registration_fee("Chief Physician"), 50.0);
        assert_eq!(registration_fee("副主任医师"), 30.0);
        assert_eq!(registration_fee("Resident"), 15.0);
    }

    #[test]
    fn prescription_item_requires_positive_quantity() {
        let item = PrescriptionItem::new(1, 0);
        assert_eq!(
            item.validate(),
            Err(ValidationError::NonPositiveValue("quantity"))
        );
        assert!(PrescriptionItem::new(1, 2).validate().is_ok());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_value(RegistrationStatus::AwaitingConsultation).unwrap(),
            serde_json::json!("awaiting_consultation")
        );
    }
}
