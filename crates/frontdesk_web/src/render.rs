//! Tera templates compiled into the binary.

use crate::error::WebError;
use crate::session::Session;
use axum::response::Html;
use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("doctor_queue.html", include_str!("../templates/doctor_queue.html")),
    ("diagnose.html", include_str!("../templates/diagnose.html")),
    ("billing.html", include_str!("../templates/billing.html")),
    ("admin_inventory.html", include_str!("../templates/admin_inventory.html")),
    ("admin_data.html", include_str!("../templates/admin_data.html")),
    ("patient_login.html", include_str!("../templates/patient_login.html")),
    ("patient_portal.html", include_str!("../templates/patient_portal.html")),
];

pub fn build_templates() -> Result<Tera, WebError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// Renders `template`, adding the session's role and pending flashes.
pub fn render(
    tera: &Tera,
    session: &Session,
    template: &str,
    mut context: Context,
) -> Result<Html<String>, WebError> {
    context.insert("flashes", &session.take_flashes());
    context.insert("role", &session.role());
    context.insert("patient_login", &session.patient());
    Ok(Html(tera.render(template, &context)?))
}

#[cfg(test)]
mod tests {
    use super::{build_templates, TEMPLATES};

    #[test]
    fn every_template_parses() {
        let tera = build_templates().unwrap();
        for (name, _) in TEMPLATES {
            assert!(tera.get_template_names().any(|n| n == *name), "{name} missing");
        }
    }
}
