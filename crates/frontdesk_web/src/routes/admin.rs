//! Admin data maintenance: patients, doctors, departments and drugs.

use super::{optional_text, parse_number};
use crate::error::{report, WebError, INVALID_INPUT_MESSAGE};
use crate::render::render;
use crate::session::{FlashLevel, Session};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use frontdesk_core::model::{NewDepartment, NewDoctor, NewDrug, NewPatient};
use frontdesk_core::{AdminService, DeleteOutcome, ServiceResult};
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;
use std::str::FromStr;
use tera::Context;

const ADMIN_PAGE: &str = "/admin/data";

pub fn router() -> Router<AppState> {
    Router::new().route(ADMIN_PAGE, get(overview).post(maintain))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Patient,
    Doctor,
    Department,
    Drug,
}

impl Entity {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            "department" => Some(Self::Department),
            "drug" => Some(Self::Drug),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Doctor => "Doctor",
            Self::Department => "Department",
            Self::Drug => "Drug",
        }
    }
}

/// Parsed admin form submission.
#[derive(Debug, Clone)]
enum AdminCommand {
    AddPatient(NewPatient),
    AddDoctor(NewDoctor),
    AddDepartment(NewDepartment),
    AddDrug(NewDrug),
    Delete(Entity, i64),
}

enum CommandResult {
    Added(Entity, i64),
    Deleted(DeleteOutcome),
}

/// Why an admin form could not be turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandError {
    /// Action or entity type is not one the page offers.
    UnknownAction,
    /// Numeric field is blank or malformed.
    InvalidNumber(&'static str),
}

impl AdminCommand {
    fn parse(form: &HashMap<String, String>) -> Result<Self, CommandError> {
        let action = form.get("action").map(|v| v.trim()).unwrap_or_default();
        let entity = form
            .get("entity_type")
            .and_then(|v| Entity::parse(v.trim()))
            .ok_or(CommandError::UnknownAction)?;
        let text = |name: &str| {
            form.get(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let command = match (action, entity) {
            ("delete", entity) => Self::Delete(entity, required_number(form, "id")?),
            ("add", Entity::Patient) => Self::AddPatient(NewPatient {
                patient_name: text("patient_name"),
                gender: text("gender"),
                date_of_birth: text("date_of_birth"),
                phone: text("phone"),
                address: optional_text(form.get("address")),
                id_card: text("id_card"),
            }),
            ("add", Entity::Doctor) => Self::AddDoctor(NewDoctor {
                doctor_name: text("doctor_name"),
                gender: text("gender"),
                title: text("title"),
                department_id: required_number(form, "department_id")?,
                phone: text("phone"),
                email: optional_text(form.get("email")),
                specialization: optional_text(form.get("specialization")),
            }),
            ("add", Entity::Department) => Self::AddDepartment(NewDepartment {
                department_name: text("department_name"),
                description: optional_text(form.get("description")),
                location: optional_text(form.get("location")),
                phone: optional_text(form.get("phone")),
            }),
            ("add", Entity::Drug) => {
                let stored_quantity = match optional_text(form.get("stored_quantity")) {
                    Some(_) => required_number(form, "stored_quantity")?,
                    None => 0,
                };
                Self::AddDrug(NewDrug {
                    drug_name: text("drug_name"),
                    drug_code: text("drug_code"),
                    specification: text("specification"),
                    manufacturer: text("manufacturer"),
                    unit_price: required_number(form, "unit_price")?,
                    stored_quantity,
                    expiry_date: optional_text(form.get("expiry_date")),
                })
            }
            _ => return Err(CommandError::UnknownAction),
        };
        Ok(command)
    }

    fn entity(&self) -> Entity {
        match self {
            Self::AddPatient(_) => Entity::Patient,
            Self::AddDoctor(_) => Entity::Doctor,
            Self::AddDepartment(_) => Entity::Department,
            Self::AddDrug(_) => Entity::Drug,
            Self::Delete(entity, _) => *entity,
        }
    }

    fn execute(&self, conn: &Connection) -> ServiceResult<CommandResult> {
        let admin = AdminService::new(conn);
        let result = match self {
            Self::AddPatient(patient) => {
                CommandResult::Added(Entity::Patient, admin.add_patient(patient)?)
            }
            Self::AddDoctor(doctor) => {
                CommandResult::Added(Entity::Doctor, admin.add_doctor(doctor)?)
            }
            Self::AddDepartment(department) => {
                CommandResult::Added(Entity::Department, admin.add_department(department)?)
            }
            Self::AddDrug(drug) => CommandResult::Added(Entity::Drug, admin.add_drug(drug)?),
            Self::Delete(Entity::Patient, id) => {
                CommandResult::Deleted(admin.delete_patient(*id)?)
            }
            Self::Delete(Entity::Doctor, id) => CommandResult::Deleted(admin.delete_doctor(*id)?),
            Self::Delete(Entity::Department, id) => {
                CommandResult::Deleted(admin.delete_department(*id)?)
            }
            Self::Delete(Entity::Drug, id) => CommandResult::Deleted(admin.delete_drug(*id)?),
        };
        Ok(result)
    }
}

fn required_number<T: FromStr>(
    form: &HashMap<String, String>,
    name: &'static str,
) -> Result<T, CommandError> {
    parse_number(form.get(name).map(String::as_str)).ok_or(CommandError::InvalidNumber(name))
}

async fn overview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    let lists = state
        .run(|conn| {
            let admin = AdminService::new(conn);
            Ok((
                admin.list_patients()?,
                admin.list_doctors()?,
                admin.list_departments()?,
                admin.list_drugs()?,
            ))
        })
        .await;
    let (patients, doctors, departments, drugs) = match lists {
        Ok(lists) => lists,
        Err(err) => {
            report(&session, "Could not load data", err)?;
            (Vec::new(), Vec::new(), Vec::new(), Vec::new())
        }
    };

    let mut context = Context::new();
    context.insert("patients", &patients);
    context.insert("doctors", &doctors);
    context.insert("departments", &departments);
    context.insert("drugs", &drugs);
    Ok(render(&state.templates, &session, "admin_data.html", context)?.into_response())
}

async fn maintain(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let command = match AdminCommand::parse(&form) {
        Ok(command) => command,
        Err(CommandError::UnknownAction) => {
            session.flash(FlashLevel::Warning, "Unknown admin action");
            return Ok(Redirect::to(ADMIN_PAGE).into_response());
        }
        Err(CommandError::InvalidNumber(field)) => {
            info!("event=admin_form module=web status=rejected field={field}");
            session.flash(FlashLevel::Danger, INVALID_INPUT_MESSAGE);
            return Ok(Redirect::to(ADMIN_PAGE).into_response());
        }
    };

    let entity = command.entity();
    match state.run(move |conn| command.execute(conn)).await {
        Ok(CommandResult::Added(entity, id)) => session.flash(
            FlashLevel::Success,
            format!("{} added successfully! {} ID: {id}", entity.label(), entity.label()),
        ),
        Ok(CommandResult::Deleted(outcome)) => {
            let level = if outcome.is_deleted() {
                FlashLevel::Success
            } else {
                FlashLevel::Danger
            };
            session.flash(level, outcome.message());
        }
        Err(err) => report(&session, &format!("{} update failed", entity.label()), err)?,
    }
    Ok(Redirect::to(ADMIN_PAGE).into_response())
}
