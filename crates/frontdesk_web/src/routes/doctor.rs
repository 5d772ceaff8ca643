//! Doctor queue and diagnosis pages.

use super::parse_number;
use crate::error::{report, WebError};
use crate::render::render;
use crate::session::{FlashLevel, Session};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use frontdesk_core::model::{PrescriptionItem, DEFAULT_DOSAGE, DEFAULT_DURATION_DAYS};
use frontdesk_core::ConsultationService;
use std::collections::HashMap;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctor/queue", get(queue))
        .route("/doctor/diagnose/:reg_id", get(diagnose_form).post(diagnose))
}

async fn queue(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    let Some(doctor_id) = parse_number::<i64>(session.user_id().as_deref()) else {
        session.flash(FlashLevel::Warning, "Please sign in as a doctor with your doctor ID first");
        return Ok(Redirect::to("/").into_response());
    };

    let patients = match state
        .run(move |conn| ConsultationService::new(conn).waiting_list(doctor_id))
        .await
    {
        Ok(patients) => patients,
        Err(err) => {
            report(&session, "Could not load the patient queue", err)?;
            Vec::new()
        }
    };

    let mut context = Context::new();
    context.insert("patients", &patients);
    context.insert("doctor_id", &doctor_id);
    Ok(render(&state.templates, &session, "doctor_queue.html", context)?.into_response())
}

async fn diagnose_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(registration_id): Path<i64>,
) -> Result<Response, WebError> {
    let loaded = state
        .run(move |conn| {
            let service = ConsultationService::new(conn);
            let Some(subject) = service.diagnosis_subject(registration_id)? else {
                return Ok(None);
            };
            Ok(Some((subject, service.prescribable_drugs()?)))
        })
        .await;

    let (subject, drugs) = match loaded {
        Ok(Some(found)) => found,
        Ok(None) => {
            session.flash(FlashLevel::Danger, "Registration record not found");
            return Ok(Redirect::to("/doctor/queue").into_response());
        }
        Err(err) => {
            report(&session, "Could not load patient information", err)?;
            return Ok(Redirect::to("/doctor/queue").into_response());
        }
    };

    let mut context = Context::new();
    context.insert("patient", &subject);
    context.insert("drugs", &drugs);
    context.insert("reg_id", &registration_id);
    context.insert("default_dosage", DEFAULT_DOSAGE);
    context.insert("default_duration_days", &DEFAULT_DURATION_DAYS);
    Ok(render(&state.templates, &session, "diagnose.html", context)?.into_response())
}

async fn diagnose(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(registration_id): Path<i64>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let back = format!("/doctor/diagnose/{registration_id}");

    let Some(items) = prescription_lines(&form) else {
        session.flash(FlashLevel::Danger, "Invalid prescription input");
        return Ok(Redirect::to(&back).into_response());
    };

    match state
        .run(move |conn| ConsultationService::new(conn).submit_diagnosis(registration_id, &items))
        .await
    {
        Ok(payment_ids) => {
            let ids = payment_ids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            session.flash(
                FlashLevel::Success,
                format!("Diagnosis submitted! Payment IDs: {ids}"),
            );
            Ok(Redirect::to("/doctor/queue").into_response())
        }
        Err(err) => {
            report(&session, "Diagnosis failed", err)?;
            Ok(Redirect::to(&back).into_response())
        }
    }
}

/// Reads `drug_id_N` / `quantity_N` lines for N = 1, 2, ... until
/// `drug_id_N` is absent.
///
/// Lines with a blank drug or quantity are skipped; a malformed number
/// rejects the whole form.
fn prescription_lines(form: &HashMap<String, String>) -> Option<Vec<PrescriptionItem>> {
    let text = |name: String| form.get(&name).map(|v| v.trim()).filter(|v| !v.is_empty());

    let mut items = Vec::new();
    for line in 1.. {
        let Some(raw_drug) = form.get(&format!("drug_id_{line}")) else {
            break;
        };
        let (Some(drug_id), Some(quantity)) = (
            Some(raw_drug.trim()).filter(|v| !v.is_empty()),
            text(format!("quantity_{line}")),
        ) else {
            continue;
        };

        let mut item = PrescriptionItem::new(drug_id.parse().ok()?, quantity.parse().ok()?);
        if let Some(dosage) = text(format!("dosage_{line}")) {
            item.dosage = dosage.to_string();
        }
        if let Some(days) = text(format!("duration_days_{line}")) {
            item.duration_days = days.parse().ok()?;
        }
        if let Some(notes) = text(format!("notes_{line}")) {
            item.notes = notes.to_string();
        }
        items.push(item);
    }
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::prescription_lines;
    use frontdesk_core::model::{DEFAULT_DOSAGE, DEFAULT_DURATION_DAYS};
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn lines_are_read_until_first_gap_with_defaults() {
        let items = prescription_lines(&form(&[
            ("drug_id_1", "3"),
            ("quantity_1", "2"),
            ("drug_id_2", "4"),
            ("quantity_2", "1"),
            ("dosage_2", "twice daily"),
            ("duration_days_2", "3"),
            ("notes_2", "after meals"),
            ("drug_id_4", "9"),
            ("quantity_4", "9"),
        ]))
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].drug_id, 3);
        assert_eq!(items[0].dosage, DEFAULT_DOSAGE);
        assert_eq!(items[0].duration_days, DEFAULT_DURATION_DAYS);
        assert_eq!(items[1].dosage, "twice daily");
        assert_eq!(items[1].duration_days, 3);
        assert_eq!(items[1].notes, "after meals");
    }

    #[test]
    fn blank_lines_are_skipped_and_malformed_numbers_rejected() {
        let items = prescription_lines(&form(&[
            ("drug_id_1", ""),
            ("quantity_1", "2"),
            ("drug_id_2", "5"),
            ("quantity_2", "1"),
        ]))
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].drug_id, 5);

        assert!(prescription_lines(&form(&[("drug_id_1", "x"), ("quantity_1", "1")])).is_none());
        assert!(prescription_lines(&form(&[])).unwrap().is_empty());
    }
}
