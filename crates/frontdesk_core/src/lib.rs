//! Core domain logic for the hospital front desk.
//! Storage, business rules and use cases live here; the web crate only
//! renders and routes.

pub mod db;
pub mod logging;
pub mod model;
pub mod procedure;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, DomainSignal, SignalCode};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use procedure::{call_procedure, ProcedureOutput, ResultSet, StoredProcedure};
pub use repo::{RepoError, RepoResult};
pub use service::admin_service::AdminService;
pub use service::billing_service::{BillingService, PaymentOutcome};
pub use service::consultation_service::ConsultationService;
pub use service::inventory_service::{InventoryService, DEFAULT_LOW_STOCK_THRESHOLD};
pub use service::patient_service::PatientPortalService;
pub use service::registration_service::{
    RegistrationReceipt, RegistrationRequest, RegistrationService,
};
pub use service::{DeleteOutcome, ServiceError, ServiceResult};

