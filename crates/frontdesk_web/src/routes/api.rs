//! JSON lookup used by the registration form.

use crate::error::WebError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use frontdesk_core::RegistrationService;
use log::error;
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/doctors/:dept_id", get(doctors_by_department))
}

async fn doctors_by_department(
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
) -> Response {
    match state
        .run(move |conn| RegistrationService::new(conn).doctors_by_department(department_id))
        .await
    {
        Ok(doctors) => Json(json!({ "success": true, "doctors": doctors })).into_response(),
        Err(err) => failure(err),
    }
}

fn failure(err: WebError) -> Response {
    error!(
        "event=api_request module=web status=error endpoint=doctors_by_department error={}",
        err
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
        .into_response()
}
