//! Patient login and self-service portal.

use crate::error::{report, WebError};
use crate::render::render;
use crate::session::{FlashLevel, PatientLogin, Session};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use frontdesk_core::PatientPortalService;
use serde::Deserialize;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patient/login", get(login_form).post(login))
        .route("/patient/portal", get(portal))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    id_card: String,
}

async fn login_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, WebError> {
    render(&state.templates, &session, "patient_login.html", Context::new())
}

async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let id_card = form.id_card.trim().to_string();
    if id_card.is_empty() {
        session.flash(FlashLevel::Warning, "Please enter your ID card number");
        return Ok(Redirect::to("/patient/login").into_response());
    }

    match state
        .run(move |conn| PatientPortalService::new(conn).authenticate(&id_card))
        .await
    {
        Ok(Some(patient)) => {
            session.flash(
                FlashLevel::Success,
                format!("Welcome, {}!", patient.patient_name),
            );
            session.sign_in_patient(PatientLogin {
                patient_id: patient.patient_id,
                patient_name: patient.patient_name,
            });
            Ok(Redirect::to("/patient/portal").into_response())
        }
        Ok(None) => {
            session.flash(
                FlashLevel::Danger,
                "Unknown ID card number; no patient record was found",
            );
            Ok(Redirect::to("/patient/login").into_response())
        }
        Err(err) => {
            report(&session, "Login failed", err)?;
            Ok(Redirect::to("/patient/login").into_response())
        }
    }
}

async fn portal(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    let Some(login) = session.patient() else {
        session.flash(FlashLevel::Warning, "Please log in first");
        return Ok(Redirect::to("/patient/login").into_response());
    };

    let patient_id = login.patient_id;
    let history = state
        .run(move |conn| {
            let service = PatientPortalService::new(conn);
            Ok((
                service.registrations(patient_id)?,
                service.prescriptions(patient_id)?,
                service.payments(patient_id)?,
            ))
        })
        .await;
    let (registrations, prescriptions, payments) = match history {
        Ok(history) => history,
        Err(err) => {
            report(&session, "Could not load your records", err)?;
            (Vec::new(), Vec::new(), Vec::new())
        }
    };

    let mut context = Context::new();
    context.insert("patient_name", &login.patient_name);
    context.insert("registrations", &registrations);
    context.insert("prescriptions", &prescriptions);
    context.insert("payments", &payments);
    Ok(render(&state.templates, &session, "patient_portal.html", context)?.into_response())
}
