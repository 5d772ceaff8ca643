#![allow(dead_code)]

use frontdesk_core::db::open_db_in_memory;
use frontdesk_core::model::{NewDepartment, NewDoctor, NewDrug, NewPatient};
use frontdesk_core::{AdminService, BillingService, RegistrationRequest, RegistrationService};
use rusqlite::Connection;

pub struct Fixture {
    pub conn: Connection,
    pub department_id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub drug_id: i64,
}

/// Cardiology with one chief physician, one patient and one drug
/// (stock 5, price 12.5).
pub fn seeded() -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let admin = AdminService::new(&conn);

    let department_id = admin.add_department(&department("Cardiology")).unwrap();
    let doctor_id = admin
        .add_doctor(&doctor("Dr. Lin", "Chief Physician", department_id))
        .unwrap();
    let patient_id = admin.add_patient(&patient("Alice Wong", "110101199001011234")).unwrap();
    let drug_id = admin.add_drug(&drug("Aspirin", "ASP-100", 12.5, 5)).unwrap();
    drop(admin);

    Fixture {
        conn,
        department_id,
        doctor_id,
        patient_id,
        drug_id,
    }
}

pub fn department(name: &str) -> NewDepartment {
    NewDepartment {
        department_name: name.to_string(),
        description: None,
        location: Some("Building A".to_string()),
        phone: None,
    }
}

pub fn doctor(name: &str, title: &str, department_id: i64) -> NewDoctor {
    NewDoctor {
        doctor_name: name.to_string(),
        gender: "F".to_string(),
        title: title.to_string(),
        department_id,
        phone: "555-0100".to_string(),
        email: None,
        specialization: None,
    }
}

pub fn patient(name: &str, id_card: &str) -> NewPatient {
    NewPatient {
        patient_name: name.to_string(),
        gender: "F".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        phone: "555-0199".to_string(),
        address: Some("  ".to_string()),
        id_card: id_card.to_string(),
    }
}

pub fn drug(name: &str, code: &str, unit_price: f64, stored_quantity: i64) -> NewDrug {
    NewDrug {
        drug_name: name.to_string(),
        drug_code: code.to_string(),
        specification: "100mg x 30".to_string(),
        manufacturer: "Acme Pharma".to_string(),
        unit_price,
        stored_quantity,
        expiry_date: Some(String::new()),
    }
}

/// Registers `patient_id` with the fixture doctor and pays the fee, leaving
/// the registration awaiting consultation.
pub fn register_and_pay(fx: &Fixture, patient_id: i64) -> i64 {
    let receipt = RegistrationService::new(&fx.conn)
        .register_patient(&RegistrationRequest::new(
            patient_id,
            fx.department_id,
            fx.doctor_id,
        ))
        .unwrap();

    let billing = BillingService::new(&fx.conn);
    let pending = billing.pending_payments(patient_id).unwrap();
    let fee_bill = pending
        .iter()
        .find(|bill| bill.registration_id == receipt.registration_id)
        .unwrap();
    assert!(billing.pay_bill(fee_bill.payment_id).unwrap().is_paid());

    receipt.registration_id
}

pub fn stock_of(conn: &Connection, drug_id: i64) -> i64 {
    conn.query_row(
        "SELECT stored_quantity FROM drug WHERE drug_id = ?1;",
        [drug_id],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
