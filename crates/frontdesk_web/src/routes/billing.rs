//! Billing center.

use super::parse_number;
use crate::error::{report, WebError, INVALID_INPUT_MESSAGE};
use crate::render::render;
use crate::session::{FlashLevel, Session};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use frontdesk_core::{BillingService, PaymentOutcome};
use log::warn;
use serde::Deserialize;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new().route("/billing", get(pending_bills).post(pay))
}

#[derive(Debug, Deserialize)]
struct BillingQuery {
    patient_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayForm {
    payment_id: Option<String>,
    patient_id: Option<String>,
}

async fn pending_bills(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<BillingQuery>,
) -> Result<Response, WebError> {
    let raw_patient_id = query.patient_id.unwrap_or_default().trim().to_string();

    let mut payments = Vec::new();
    if !raw_patient_id.is_empty() {
        match parse_number::<i64>(Some(&raw_patient_id)) {
            Some(patient_id) => {
                match state
                    .run(move |conn| BillingService::new(conn).pending_payments(patient_id))
                    .await
                {
                    Ok(pending) => payments = pending,
                    Err(err) => report(&session, "Could not load bills", err)?,
                }
            }
            None => session.flash(FlashLevel::Danger, INVALID_INPUT_MESSAGE),
        }
    }

    let mut context = Context::new();
    context.insert("payments", &payments);
    context.insert("patient_id", &raw_patient_id);
    Ok(render(&state.templates, &session, "billing.html", context)?.into_response())
}

async fn pay(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<PayForm>,
) -> Result<Response, WebError> {
    let back = billing_page(parse_number::<i64>(form.patient_id.as_deref()));

    let Some(payment_id) = parse_number::<i64>(form.payment_id.as_deref()) else {
        session.flash(FlashLevel::Danger, "Invalid payment ID");
        return Ok(Redirect::to(&back).into_response());
    };

    match state
        .run(move |conn| BillingService::new(conn).pay_bill(payment_id))
        .await
    {
        Ok(PaymentOutcome::Paid) => {
            session.flash(FlashLevel::Success, PaymentOutcome::Paid.message());
        }
        Ok(PaymentOutcome::InventoryShortfall { drug_name, message }) => {
            warn!(
                "event=payment_rejected module=web status=rejected payment_id={} drug={:?}",
                payment_id, drug_name
            );
            session.flash(FlashLevel::Danger, format!("Payment failed: {message}"));
        }
        Ok(outcome) => session.flash(FlashLevel::Danger, outcome.message()),
        Err(err) => report(&session, "Payment failed", err)?,
    }
    Ok(Redirect::to(&back).into_response())
}

/// Billing page URL; a malformed patient id falls back to the empty page.
fn billing_page(patient_id: Option<i64>) -> String {
    match patient_id {
        Some(patient_id) => format!("/billing?patient_id={patient_id}"),
        None => "/billing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::billing_page;

    #[test]
    fn billing_page_only_carries_numeric_patient_ids() {
        assert_eq!(billing_page(Some(12)), "/billing?patient_id=12");
        assert_eq!(billing_page(None), "/billing");
    }
}
