//! Registration desk.

use super::parse_number;
use crate::error::{report, WebError, INVALID_INPUT_MESSAGE};
use crate::render::render;
use crate::session::{FlashLevel, Session};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use frontdesk_core::{RegistrationRequest, RegistrationService};
use std::collections::HashMap;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new().route("/register", get(register_form).post(register))
}

async fn register_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    let departments = match state
        .run(|conn| RegistrationService::new(conn).departments())
        .await
    {
        Ok(departments) => departments,
        Err(err) => {
            report(&session, "Could not load departments", err)?;
            Vec::new()
        }
    };

    let mut context = Context::new();
    context.insert("departments", &departments);
    Ok(render(&state.templates, &session, "register.html", context)?.into_response())
}

async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let field = |name: &str| parse_number::<i64>(form.get(name).map(String::as_str));
    let (Some(patient_id), Some(department_id), Some(doctor_id)) =
        (field("patient_id"), field("department_id"), field("doctor_id"))
    else {
        session.flash(FlashLevel::Danger, INVALID_INPUT_MESSAGE);
        return Ok(Redirect::to("/register").into_response());
    };

    let mut request = RegistrationRequest::new(patient_id, department_id, doctor_id);
    request.chief_complaint = super::optional_text(form.get("chief_complaint"));
    request.payment_method = super::optional_text(form.get("payment_method"));

    match state
        .run(move |conn| RegistrationService::new(conn).register_patient(&request))
        .await
    {
        Ok(receipt) => {
            session.flash(
                FlashLevel::Success,
                format!(
                    "Registration succeeded! Registration ID: {}. Amount due: ¥{:.2}",
                    receipt.registration_id, receipt.pending_amount
                ),
            );
            Ok(Redirect::to(&format!("/billing?patient_id={patient_id}")).into_response())
        }
        Err(err) => {
            report(&session, "Registration failed", err)?;
            Ok(Redirect::to("/register").into_response())
        }
    }
}
