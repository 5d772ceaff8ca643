mod common;

use common::{count, patient, register_and_pay, seeded, stock_of};
use frontdesk_core::model::{PaymentType, PrescriptionItem, RegistrationStatus};
use frontdesk_core::{
    AdminService, BillingService, ConsultationService, DbError, PaymentOutcome,
    RegistrationRequest, RegistrationService, ServiceError, SignalCode,
};

#[test]
fn diagnosis_without_lines_is_rejected() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);

    let err = ConsultationService::new(&fx.conn)
        .submit_diagnosis(registration_id, &[])
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyPrescription));
}

#[test]
fn diagnosis_requires_paid_registration() {
    let fx = seeded();
    let receipt = RegistrationService::new(&fx.conn)
        .register_patient(&RegistrationRequest::new(
            fx.patient_id,
            fx.department_id,
            fx.doctor_id,
        ))
        .unwrap();

    let err = ConsultationService::new(&fx.conn)
        .submit_diagnosis(receipt.registration_id, &[PrescriptionItem::new(fx.drug_id, 1)])
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Signal(ref s) if s.code == SignalCode::InvalidRegistrationState
    ));
}

#[test]
fn finished_consultation_creates_medicine_bills_without_touching_stock() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    let service = ConsultationService::new(&fx.conn);

    let mut line = PrescriptionItem::new(fx.drug_id, 2);
    line.notes = "after meals".to_string();
    let payment_ids = service.submit_diagnosis(registration_id, &[line]).unwrap();
    assert_eq!(payment_ids.len(), 1);

    let subject = service.diagnosis_subject(registration_id).unwrap().unwrap();
    assert_eq!(subject.status, RegistrationStatus::Completed);
    assert!(service.waiting_list(fx.doctor_id).unwrap().is_empty());
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 5);

    let pending = BillingService::new(&fx.conn)
        .pending_payments(fx.patient_id)
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payment_id, payment_ids[0]);
    assert_eq!(pending[0].payment_type, PaymentType::Medicine);
    assert_eq!(pending[0].amount, 25.0);
}

#[test]
fn stock_is_checked_against_summed_quantity_per_drug() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);

    let lines = [
        PrescriptionItem::new(fx.drug_id, 3),
        PrescriptionItem::new(fx.drug_id, 3),
    ];
    let err = ConsultationService::new(&fx.conn)
        .submit_diagnosis(registration_id, &lines)
        .unwrap_err();
    match err {
        ServiceError::Signal(signal) => {
            assert_eq!(signal.code, SignalCode::InsufficientStock);
            assert!(signal.message.contains("\"Aspirin\""));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(count(&fx.conn, "prescription"), 0);
    let status: i64 = fx
        .conn
        .query_row(
            "SELECT status FROM registration WHERE registration_id = ?1;",
            [registration_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(status, RegistrationStatus::AwaitingConsultation.to_db());
}

#[test]
fn paying_medicine_bill_decrements_stock_once() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    let payment_ids = ConsultationService::new(&fx.conn)
        .submit_diagnosis(registration_id, &[PrescriptionItem::new(fx.drug_id, 4)])
        .unwrap();

    let billing = BillingService::new(&fx.conn);
    assert_eq!(billing.pay_bill(payment_ids[0]).unwrap(), PaymentOutcome::Paid);
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 1);

    assert_eq!(
        billing.pay_bill(payment_ids[0]).unwrap(),
        PaymentOutcome::NotPayable {
            payment_id: payment_ids[0]
        }
    );
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 1);
    assert!(billing.pending_payments(fx.patient_id).unwrap().is_empty());
}

#[test]
fn unknown_payment_is_not_payable() {
    let fx = seeded();
    let outcome = BillingService::new(&fx.conn).pay_bill(4242).unwrap();
    assert!(!outcome.is_paid());
    assert!(outcome.message().contains("4242"));
}

#[test]
fn competing_prescriptions_report_shortfall_with_drug_name() {
    let fx = seeded();
    let second_patient = AdminService::new(&fx.conn)
        .add_patient(&patient("Bob Chen", "110101198502023456"))
        .unwrap();
    let first = register_and_pay(&fx, fx.patient_id);
    let second = register_and_pay(&fx, second_patient);

    let consultation = ConsultationService::new(&fx.conn);
    let first_bill = consultation
        .submit_diagnosis(first, &[PrescriptionItem::new(fx.drug_id, 4)])
        .unwrap()[0];
    let second_bill = consultation
        .submit_diagnosis(second, &[PrescriptionItem::new(fx.drug_id, 4)])
        .unwrap()[0];

    let billing = BillingService::new(&fx.conn);
    assert!(billing.pay_bill(first_bill).unwrap().is_paid());
    match billing.pay_bill(second_bill).unwrap() {
        PaymentOutcome::InventoryShortfall { drug_name, message } => {
            assert_eq!(drug_name, "Aspirin");
            assert!(message.contains("available 1"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 1);
    assert_eq!(billing.pending_payments(second_patient).unwrap().len(), 1);
}

#[test]
fn stock_guard_trigger_blocks_direct_payment_updates() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    let payment_id = ConsultationService::new(&fx.conn)
        .submit_diagnosis(registration_id, &[PrescriptionItem::new(fx.drug_id, 5)])
        .unwrap()[0];
    fx.conn
        .execute(
            "UPDATE drug SET stored_quantity = 2 WHERE drug_id = ?1;",
            [fx.drug_id],
        )
        .unwrap();

    let err = fx
        .conn
        .execute(
            "UPDATE payment SET payment_status = 1 WHERE payment_id = ?1;",
            [payment_id],
        )
        .map_err(DbError::from)
        .unwrap_err();
    let signal = err.as_signal().expect("trigger abort should classify as signal");
    assert_eq!(signal.code, SignalCode::InsufficientStock);
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 2);
}

#[test]
fn prescribable_drugs_exclude_empty_stock() {
    let fx = seeded();
    let admin = AdminService::new(&fx.conn);
    admin
        .add_drug(&common::drug("Placebo", "PLC-0", 1.0, 0))
        .unwrap();

    let drugs = ConsultationService::new(&fx.conn)
        .prescribable_drugs()
        .unwrap();
    assert_eq!(drugs.len(), 1);
    assert_eq!(drugs[0].drug_name, "Aspirin");
}

#[test]
fn single_prescription_line_is_billed_without_stock_check() {
    use frontdesk_core::procedure::{call_procedure, CreatePrescription};

    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);

    let output = call_procedure(
        &fx.conn,
        &CreatePrescription {
            registration_id,
            item: PrescriptionItem::new(fx.drug_id, 8),
            payment_method: Some("Cash".to_string()),
        },
    )
    .unwrap();

    let pending = BillingService::new(&fx.conn)
        .pending_payments(fx.patient_id)
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payment_id, output.out);
    assert_eq!(pending[0].amount, 100.0);
    assert_eq!(pending[0].payment_method.as_deref(), Some("Cash"));
    assert_eq!(stock_of(&fx.conn, fx.drug_id), 5);

    let waiting = ConsultationService::new(&fx.conn)
        .waiting_list(fx.doctor_id)
        .unwrap();
    assert_eq!(waiting.len(), 1);

    let err = call_procedure(
        &fx.conn,
        &CreatePrescription {
            registration_id: 9_999,
            item: PrescriptionItem::new(fx.drug_id, 1),
            payment_method: None,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DbError::Signal(ref s) if s.code == SignalCode::InvalidReference
    ));
}

#[test]
fn overflowing_quantities_for_one_drug_are_rejected_as_shortfall() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    let half = i64::MAX / 2 + 1;

    let err = ConsultationService::new(&fx.conn)
        .submit_diagnosis(
            registration_id,
            &[
                PrescriptionItem::new(fx.drug_id, half),
                PrescriptionItem::new(fx.drug_id, half),
            ],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Signal(ref s) if s.code == SignalCode::InsufficientStock
    ));

    assert_eq!(count(&fx.conn, "prescription"), 0);
    let subject = ConsultationService::new(&fx.conn)
        .diagnosis_subject(registration_id)
        .unwrap()
        .unwrap();
    assert_eq!(subject.status, RegistrationStatus::AwaitingConsultation);
}

#[test]
fn finished_consultation_emits_its_prescriptions() {
    use frontdesk_core::procedure::{call_procedure, FinishConsultation};
    use rusqlite::types::Value;

    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    let mut second = PrescriptionItem::new(fx.drug_id, 2);
    second.duration_days = 3;

    let output = call_procedure(
        &fx.conn,
        &FinishConsultation {
            registration_id,
            items: vec![PrescriptionItem::new(fx.drug_id, 1), second],
            payment_method: None,
        },
    )
    .unwrap();
    assert_eq!(output.out.len(), 2);
    assert_eq!(output.result_sets.len(), 1);

    let set = &output.result_sets[0];
    assert_eq!(set.rows.len(), 2);
    assert_eq!(
        set.value(0, "drug_name"),
        Some(&Value::Text("Aspirin".to_string()))
    );
    assert_eq!(set.value(0, "quantity"), Some(&Value::Integer(1)));
    assert_eq!(set.value(1, "quantity"), Some(&Value::Integer(2)));
    assert_eq!(set.value(1, "duration_days"), Some(&Value::Integer(3)));
}
