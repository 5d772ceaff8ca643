//! Role picker, logout and the not-found fallback.

use crate::error::WebError;
use crate::render::render;
use crate::session::{FlashLevel, Role, Session};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use serde::Deserialize;
use tera::Context;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home).post(pick_role))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    role: String,
    #[serde(default)]
    user_id: String,
}

async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, WebError> {
    render(&state.templates, &session, "home.html", Context::new())
}

async fn pick_role(Extension(session): Extension<Session>, Form(form): Form<RoleForm>) -> Redirect {
    match Role::parse(&form.role) {
        Some(role) => {
            let user_id = Some(form.user_id.trim().to_string()).filter(|id| !id.is_empty());
            session.sign_in(role, user_id);
            Redirect::to(role.landing_path())
        }
        None => {
            session.flash(FlashLevel::Danger, "Invalid role selection");
            Redirect::to("/")
        }
    }
}

async fn logout(Extension(session): Extension<Session>) -> Redirect {
    if session.end() {
        session.flash(FlashLevel::Success, "You have been logged out");
    }
    Redirect::to("/")
}

pub async fn not_found(Extension(session): Extension<Session>) -> Response {
    session.flash(FlashLevel::Danger, "Page not found");
    Redirect::to("/").into_response()
}
