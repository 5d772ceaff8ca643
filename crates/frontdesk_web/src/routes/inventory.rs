//! Low-stock report.

use super::parse_number;
use crate::error::{report, WebError};
use crate::render::render;
use crate::session::Session;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Router};
use frontdesk_core::repo::drug_repo::SqliteDrugRepository;
use frontdesk_core::InventoryService;
use serde::Deserialize;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/inventory", get(low_stock))
}

#[derive(Debug, Deserialize)]
struct InventoryQuery {
    threshold: Option<String>,
}

async fn low_stock(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<InventoryQuery>,
) -> Result<Html<String>, WebError> {
    // Malformed thresholds fall back to the configured default.
    let threshold =
        parse_number::<i64>(query.threshold.as_deref()).unwrap_or(state.low_stock_threshold);

    let drugs = match state
        .run(move |conn| {
            InventoryService::new(SqliteDrugRepository::new(conn)).low_stock_drugs(threshold)
        })
        .await
    {
        Ok(drugs) => drugs,
        Err(err) => {
            report(&session, "Could not load inventory", err)?;
            Vec::new()
        }
    };

    let mut context = Context::new();
    context.insert("drugs", &drugs);
    context.insert("threshold", &threshold);
    render(&state.templates, &session, "admin_inventory.html", context)
}
