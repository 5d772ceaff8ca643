//! Payment records.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentType {
    Registration,
    Medicine,
}

impl PaymentType {
    pub fn to_db(self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Medicine => "Medicine",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "Registration" => Some(Self::Registration),
            "Medicine" => Some(Self::Medicine),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn to_db(self) -> i64 {
        match self {
            Self::Unpaid => 0,
            Self::Paid => 1,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unpaid),
            1 => Some(Self::Paid),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
        }
    }
}

/// Unpaid bill shown in the billing center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPayment {
    pub payment_id: i64,
    pub registration_id: i64,
    pub payment_type: PaymentType,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub registration_date: String,
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
}

/// Payment history row for the patient portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientPayment {
    pub payment_id: i64,
    pub registration_id: i64,
    pub payment_type: PaymentType,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_status_text: &'static str,
    pub payment_date: Option<String>,
    pub created_at: String,
    pub registration_date: String,
}
