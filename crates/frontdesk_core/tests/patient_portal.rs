mod common;

use common::{register_and_pay, seeded};
use frontdesk_core::model::{PaymentStatus, PaymentType, PrescriptionItem, RegistrationStatus};
use frontdesk_core::{ConsultationService, PatientPortalService};

#[test]
fn authenticate_trims_and_rejects_blank_id_cards() {
    let fx = seeded();
    let portal = PatientPortalService::new(&fx.conn);

    let found = portal.authenticate("  110101199001011234\n").unwrap().unwrap();
    assert_eq!(found.patient_id, fx.patient_id);
    assert!(portal.authenticate("   ").unwrap().is_none());
    assert!(portal.authenticate("000").unwrap().is_none());
}

#[test]
fn history_reflects_the_full_visit() {
    let fx = seeded();
    let registration_id = register_and_pay(&fx, fx.patient_id);
    ConsultationService::new(&fx.conn)
        .submit_diagnosis(registration_id, &[PrescriptionItem::new(fx.drug_id, 2)])
        .unwrap();
    let portal = PatientPortalService::new(&fx.conn);

    let registrations = portal.registrations(fx.patient_id).unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].status, RegistrationStatus::Completed);
    assert_eq!(registrations[0].status_text, "Completed");
    assert_eq!(registrations[0].fee, 50.0);
    assert_eq!(registrations[0].doctor_name.as_deref(), Some("Dr. Lin"));

    let prescriptions = portal.prescriptions(fx.patient_id).unwrap();
    assert_eq!(prescriptions.len(), 1);
    assert_eq!(prescriptions[0].drug_name, "Aspirin");
    assert_eq!(prescriptions[0].dosage, "As directed");
    assert_eq!(prescriptions[0].total_cost, 25.0);

    let payments = portal.payments(fx.patient_id).unwrap();
    assert_eq!(payments.len(), 2);
    let fee = payments
        .iter()
        .find(|p| p.payment_type == PaymentType::Registration)
        .unwrap();
    assert_eq!(fee.payment_status, PaymentStatus::Paid);
    assert!(fee.payment_date.is_some());
    let medicine = payments
        .iter()
        .find(|p| p.payment_type == PaymentType::Medicine)
        .unwrap();
    assert_eq!(medicine.payment_status_text, "Unpaid");
}
