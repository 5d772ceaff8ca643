//! Shared application state.

use crate::error::WebError;
use crate::render::build_templates;
use crate::session::SessionStore;
use frontdesk_core::ServiceResult;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};
use tera::Tera;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub templates: Arc<Tera>,
    pub sessions: SessionStore,
    /// Default threshold of the low-stock report.
    pub low_stock_threshold: i64,
}

impl AppState {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection, low_stock_threshold: i64) -> Result<Self, WebError> {
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            templates: Arc::new(build_templates()?),
            sessions: SessionStore::default(),
            low_stock_threshold,
        })
    }

    /// Runs blocking database work on the blocking pool.
    ///
    /// The connection is exclusive for the duration of `work`.
    pub async fn run<T, F>(&self, work: F) -> Result<T, WebError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            work(&conn).map_err(WebError::from)
        })
        .await?
    }
}
