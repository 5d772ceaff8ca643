use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use frontdesk_core::model::{NewDepartment, NewDoctor, NewDrug, NewPatient};
use frontdesk_core::{open_db_in_memory, AdminService};
use frontdesk_web::session::SessionStore;
use frontdesk_web::{router, AppState};
use tower::ServiceExt;

const ID_CARD: &str = "110101199001011234";

/// Browser-like client that keeps the session cookie between requests.
struct Client {
    app: Router,
    sessions: SessionStore,
    cookie: Option<String>,
}

impl Client {
    /// App over a fresh database with department 1, chief physician 1,
    /// patient 1 and drug 1 (Aspirin, stock 5).
    fn seeded() -> Self {
        let conn = open_db_in_memory().unwrap();
        {
            let admin = AdminService::new(&conn);
            let department_id = admin
                .add_department(&NewDepartment {
                    department_name: "Cardiology".to_string(),
                    description: None,
                    location: None,
                    phone: None,
                })
                .unwrap();
            admin
                .add_doctor(&NewDoctor {
                    doctor_name: "Dr. Lin".to_string(),
                    gender: "F".to_string(),
                    title: "Chief Physician".to_string(),
                    department_id,
                    phone: "555-0100".to_string(),
                    email: None,
                    specialization: None,
                })
                .unwrap();
            admin
                .add_patient(&NewPatient {
                    patient_name: "Alice Wong".to_string(),
                    gender: "F".to_string(),
                    date_of_birth: "1990-01-01".to_string(),
                    phone: "555-0199".to_string(),
                    address: None,
                    id_card: ID_CARD.to_string(),
                })
                .unwrap();
            admin
                .add_drug(&NewDrug {
                    drug_name: "Aspirin".to_string(),
                    drug_code: "ASP-100".to_string(),
                    specification: "100mg x 30".to_string(),
                    manufacturer: "Acme Pharma".to_string(),
                    unit_price: 12.5,
                    stored_quantity: 5,
                    expiry_date: None,
                })
                .unwrap();
        }

        let state = AppState::new(conn, 10).unwrap();
        Self {
            sessions: state.sessions.clone(),
            app: router(state),
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(value) = response.headers().get(SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> Response {
        let mut builder =
            Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_text(response).await
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn session_cookie_is_issued_once_something_is_stored() {
    let mut client = Client::seeded();
    let response = client.get("/").await;

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Select your role"));

    let response = client.post("/", "role=registrar").await;
    assert!(response.headers().get(SET_COOKIE).is_some());
    assert_eq!(client.sessions.len(), 1);
}

#[tokio::test]
async fn cookieless_requests_leave_no_sessions_behind() {
    let client = Client::seeded();
    for uri in ["/", "/logout", "/register"] {
        for _ in 0..50 {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let response = client.app.clone().oneshot(request).await.unwrap();
            assert!(response.headers().get(SET_COOKIE).is_none(), "GET {uri}");
        }
    }
    assert!(client.sessions.is_empty());
}

#[tokio::test]
async fn picking_a_role_redirects_to_its_landing_page() {
    let mut client = Client::seeded();

    let response = client.post("/", "role=doctor&user_id=1").await;
    assert_eq!(location(&response), "/doctor/queue");
    assert!(client
        .page("/doctor/queue")
        .await
        .contains("Waiting patients for doctor 1"));

    let response = client.post("/", "role=registrar").await;
    assert_eq!(location(&response), "/register");
}

#[tokio::test]
async fn invalid_role_is_flashed_once() {
    let mut client = Client::seeded();
    let response = client.post("/", "role=janitor").await;
    assert_eq!(location(&response), "/");

    assert!(client.page("/").await.contains("Invalid role selection"));
    assert!(!client.page("/").await.contains("Invalid role selection"));
}

#[tokio::test]
async fn doctor_queue_requires_a_doctor_id() {
    let mut client = Client::seeded();
    let response = client.get("/doctor/queue").await;
    assert_eq!(location(&response), "/");
    assert!(client.page("/").await.contains("doctor ID"));
}

#[tokio::test]
async fn doctor_lookup_api_returns_json() {
    let mut client = Client::seeded();
    let response = client.get("/api/doctors/1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["doctors"][0]["doctor_name"], "Dr. Lin");

    let body: serde_json::Value =
        serde_json::from_str(&body_text(client.get("/api/doctors/99").await).await).unwrap();
    assert_eq!(body["doctors"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn registration_redirects_to_billing_with_amount_due() {
    let mut client = Client::seeded();
    let response = client
        .post("/register", "patient_id=1&department_id=1&doctor_id=1")
        .await;
    assert_eq!(location(&response), "/billing?patient_id=1");

    let page = client.page("/billing?patient_id=1").await;
    assert!(page.contains("Registration succeeded! Registration ID: 1. Amount due: ¥50.00"));
    assert!(page.contains("name=\"payment_id\" value=\"1\""));
}

#[tokio::test]
async fn registration_errors_are_flashed_with_context() {
    let mut client = Client::seeded();

    let response = client
        .post("/register", "patient_id=abc&department_id=1&doctor_id=1")
        .await;
    assert_eq!(location(&response), "/register");
    assert!(client.page("/register").await.contains("Invalid input"));

    let form = "patient_id=1&department_id=1&doctor_id=1";
    client.post("/register", form).await;
    client.get("/billing?patient_id=1").await;
    let response = client.post("/register", form).await;
    assert_eq!(location(&response), "/register");
    assert!(client
        .page("/register")
        .await
        .contains("Registration failed: Duplicate registration"));
}

#[tokio::test]
async fn full_visit_is_visible_in_patient_portal() {
    let mut client = Client::seeded();

    client
        .post("/register", "patient_id=1&department_id=1&doctor_id=1")
        .await;
    let response = client.post("/billing", "payment_id=1&patient_id=1").await;
    assert_eq!(location(&response), "/billing?patient_id=1");
    assert!(client
        .page("/billing?patient_id=1")
        .await
        .contains("Payment processed successfully"));

    client.post("/", "role=doctor&user_id=1").await;
    assert!(client.page("/doctor/queue").await.contains("Alice Wong"));
    assert!(client.page("/doctor/diagnose/1").await.contains("Aspirin"));

    let response = client
        .post(
            "/doctor/diagnose/1",
            "drug_id_1=1&quantity_1=2&dosage_1=&duration_days_1=&notes_1=",
        )
        .await;
    assert_eq!(location(&response), "/doctor/queue");
    assert!(client
        .page("/doctor/queue")
        .await
        .contains("Diagnosis submitted! Payment IDs: 2"));

    let response = client
        .post("/patient/login", &format!("id_card={ID_CARD}"))
        .await;
    assert_eq!(location(&response), "/patient/portal");
    let portal = client.page("/patient/portal").await;
    assert!(portal.contains("Welcome, Alice Wong!"));
    assert!(portal.contains("Aspirin"));
    assert!(portal.contains("Completed"));
}

#[tokio::test]
async fn payment_redirect_ignores_malformed_patient_ids() {
    let mut client = Client::seeded();
    client
        .post("/register", "patient_id=1&department_id=1&doctor_id=1")
        .await;

    let response = client.post("/billing", "payment_id=1&patient_id=1%0A2").await;
    assert_eq!(location(&response), "/billing");

    let response = client.post("/billing", "payment_id=1&patient_id=1%26x%3D2").await;
    assert_eq!(location(&response), "/billing");

    let response = client.post("/billing", "payment_id=x&patient_id=%201%20").await;
    assert_eq!(location(&response), "/billing?patient_id=1");
    assert!(client.page("/billing").await.contains("Invalid payment ID"));
}

#[tokio::test]
async fn diagnosis_without_lines_is_rejected() {
    let mut client = Client::seeded();
    let response = client.post("/doctor/diagnose/1", "drug_id_1=&quantity_1=").await;
    assert_eq!(location(&response), "/doctor/diagnose/1");

    let response = client.get("/doctor/diagnose/1").await;
    assert_eq!(location(&response), "/doctor/queue");
}

#[tokio::test]
async fn portal_requires_patient_login() {
    let mut client = Client::seeded();
    let response = client.get("/patient/portal").await;
    assert_eq!(location(&response), "/patient/login");

    let response = client.post("/patient/login", "id_card=000").await;
    assert_eq!(location(&response), "/patient/login");
    assert!(client.page("/patient/login").await.contains("Unknown ID card number"));
}

#[tokio::test]
async fn admin_page_adds_and_blocks_deletes() {
    let mut client = Client::seeded();

    let response = client
        .post("/admin/data", "action=add&entity_type=department&department_name=Neurology")
        .await;
    assert_eq!(location(&response), "/admin/data");
    let page = client.page("/admin/data").await;
    assert!(page.contains("Department added successfully! Department ID: 2"));
    assert!(page.contains("Neurology"));

    client
        .post("/admin/data", "action=delete&entity_type=department&id=1")
        .await;
    assert!(client
        .page("/admin/data")
        .await
        .contains("This department still has 1 doctor(s)"));

    client
        .post(
            "/admin/data",
            "action=add&entity_type=doctor&doctor_name=X&gender=M&title=Resident\
             &department_id=42&phone=1",
        )
        .await;
    assert!(client
        .page("/admin/data")
        .await
        .contains("Doctor update failed: Department ID 42 does not exist"));
}

#[tokio::test]
async fn inventory_uses_configured_threshold_for_bad_input() {
    let mut client = Client::seeded();
    let page = client.page("/admin/inventory?threshold=lots").await;
    assert!(page.contains("value=\"10\""));
    assert!(page.contains("Aspirin"));

    let page = client.page("/admin/inventory?threshold=3").await;
    assert!(!page.contains("Aspirin"));
}

#[tokio::test]
async fn unknown_pages_redirect_home_with_flash() {
    let mut client = Client::seeded();
    let response = client.get("/no/such/page").await;
    assert_eq!(location(&response), "/");
    assert!(client.page("/").await.contains("Page not found"));

    client.post("/", "role=admin").await;
    let response = client.get("/logout").await;
    assert_eq!(location(&response), "/");
    assert!(client.page("/").await.contains("You have been logged out"));
}
