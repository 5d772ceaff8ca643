//! Web-layer error type and failure reporting.

use crate::session::{FlashLevel, Session};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frontdesk_core::ServiceError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message flashed for storage failures; details only go to the log.
pub const DATABASE_ERROR_MESSAGE: &str =
    "A database error occurred while processing your request; please try again later";
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input; please check your values";

#[derive(Debug)]
pub enum WebError {
    Service(ServiceError),
    Template(tera::Error),
    /// Blocking task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl Display for WebError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Template(err) => write!(f, "template error: {err}"),
            Self::Task(err) => write!(f, "database task failed: {err}"),
        }
    }
}

impl Error for WebError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Template(err) => Some(err),
            Self::Task(err) => Some(err),
        }
    }
}

impl From<ServiceError> for WebError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<tera::Error> for WebError {
    fn from(value: tera::Error) -> Self {
        Self::Template(value)
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Task(value)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(
            "event=http_error module=web status=error error_code=internal error={}",
            self
        );
        (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred").into_response()
    }
}

/// Turns a failed use case into a flash message.
///
/// Business-rule and input errors are shown as `"{context}: {message}"`;
/// storage failures are logged and shown generically. Template and task
/// failures are handed back to the caller.
pub fn report(session: &Session, context: &str, err: WebError) -> Result<(), WebError> {
    match err {
        WebError::Service(ServiceError::EmptyPrescription) => {
            session.flash(FlashLevel::Warning, "No prescription was provided");
        }
        WebError::Service(err) if err.is_user_facing() => {
            session.flash(FlashLevel::Danger, format!("{context}: {err}"));
        }
        WebError::Service(err) => {
            error!(
                "event=use_case_failed module=web status=error context={:?} error={}",
                context, err
            );
            session.flash(FlashLevel::Danger, DATABASE_ERROR_MESSAGE);
        }
        other => return Err(other),
    }
    Ok(())
}
