//! HTTP routes.
//!
//! # Responsibility
//! - Map front-desk pages and the doctor lookup API onto core use cases.
//! - Turn every failure into a flash message plus redirect, except for
//!   template and task failures, which become a 500.

use crate::session::attach_session;
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::info;
use std::time::Instant;

mod admin;
mod api;
mod billing;
mod doctor;
mod home;
mod inventory;
mod patient;
mod registration;

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(home::router())
        .merge(registration::router())
        .merge(doctor::router())
        .merge(billing::router())
        .merge(inventory::router())
        .merge(patient::router())
        .merge(admin::router())
        .merge(api::router())
        .fallback(home::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), attach_session))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    info!(
        "event=http_request module=web status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started_at.elapsed().as_millis()
    );
    response
}

/// Parses a numeric form or query value; blank and malformed input yield
/// `None`.
pub(crate) fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.map(str::trim).filter(|v| !v.is_empty())?.parse().ok()
}

/// Blank text becomes `None`.
pub(crate) fn optional_text(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
