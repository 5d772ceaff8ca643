//! Cookie-keyed in-memory sessions with a flash message queue.
//!
//! # Invariants
//! - Every request handled behind `attach_session` carries a `Session`
//!   extension.
//! - Flash messages are removed from the store when rendered.
//! - The store holds at most `MAX_SESSIONS` non-empty sessions; a session
//!   cookie is only issued once something was stored.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "frontdesk_session";

/// Front-desk role picked on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Registrar,
    Doctor,
    Admin,
    Patient,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "registrar" => Some(Self::Registrar),
            "doctor" => Some(Self::Doctor),
            "admin" => Some(Self::Admin),
            "patient" => Some(Self::Patient),
            _ => None,
        }
    }

    /// Landing page after picking this role.
    pub fn landing_path(self) -> &'static str {
        match self {
            Self::Registrar => "/register",
            Self::Doctor => "/doctor/queue",
            Self::Admin => "/admin/data",
            Self::Patient => "/patient/login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Patient identified through the ID-card login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientLogin {
    pub patient_id: i64,
    pub patient_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SessionData {
    role: Option<Role>,
    user_id: Option<String>,
    patient: Option<PatientLogin>,
    flashes: Vec<Flash>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

/// Sessions idle for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);
/// Upper bound on stored sessions; the least recently seen one is dropped
/// first.
pub const MAX_SESSIONS: usize = 10_000;

/// Process-wide session table.
///
/// A session is only stored while it holds data, so requests that never
/// write (crawlers, cookieless clients) leave no entry behind.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    idle_timeout: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_IDLE_TIMEOUT, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            idle_timeout,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session for `cookie_id`, or a fresh unsaved one when the
    /// cookie is missing, unknown or expired. The flag is true for a fresh
    /// session.
    fn resolve(&self, cookie_id: Option<&str>) -> (Session, bool) {
        let mut sessions = self.lock();
        if let Some(id) = cookie_id {
            let live = match sessions.get_mut(id) {
                Some(entry) if entry.last_seen.elapsed() < self.idle_timeout => {
                    entry.last_seen = Instant::now();
                    true
                }
                Some(_) => {
                    sessions.remove(id);
                    false
                }
                None => false,
            };
            if live {
                return (self.session(id.to_string()), false);
            }
        }
        (self.session(Uuid::new_v4().to_string()), true)
    }

    fn session(&self, id: String) -> Session {
        Session {
            id,
            store: self.clone(),
        }
    }

    /// Makes room for one new entry.
    fn evict(&self, sessions: &mut HashMap<String, SessionEntry>) {
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);
        while sessions.len() >= self.capacity {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Handle to the current request's session.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    store: SessionStore,
}

impl Session {
    fn read<T>(&self, f: impl FnOnce(&SessionData) -> T) -> T {
        let sessions = self.store.lock();
        match sessions.get(&self.id) {
            Some(entry) => f(&entry.data),
            None => f(&SessionData::default()),
        }
    }

    /// Applies `f` and stores the result; empty sessions are removed.
    fn write<T>(&self, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let mut sessions = self.store.lock();
        let stored = sessions.remove(&self.id);
        let existed = stored.is_some();
        let mut data = stored.map(|entry| entry.data).unwrap_or_default();

        let out = f(&mut data);
        if !data.is_empty() {
            if !existed {
                self.store.evict(&mut sessions);
            }
            sessions.insert(
                self.id.clone(),
                SessionEntry {
                    data,
                    last_seen: Instant::now(),
                },
            );
        }
        out
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.write(|data| data.flashes.push(Flash { level, message }));
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        if self.read(|data| data.flashes.is_empty()) {
            return Vec::new();
        }
        self.write(|data| std::mem::take(&mut data.flashes))
    }

    /// Stores the picked role and the optional staff user id.
    pub fn sign_in(&self, role: Role, user_id: Option<String>) {
        self.write(|data| {
            data.role = Some(role);
            data.user_id = user_id;
        });
    }

    pub fn sign_in_patient(&self, patient: PatientLogin) {
        self.write(|data| {
            data.role = Some(Role::Patient);
            data.patient = Some(patient);
        });
    }

    pub fn role(&self) -> Option<Role> {
        self.read(|data| data.role)
    }

    pub fn user_id(&self) -> Option<String> {
        self.read(|data| data.user_id.clone())
    }

    pub fn patient(&self) -> Option<PatientLogin> {
        self.read(|data| data.patient.clone())
    }

    /// Removes the session from the store. Returns false when nothing was
    /// stored.
    pub fn end(&self) -> bool {
        self.store.lock().remove(&self.id).is_some()
    }
}

/// Middleware that resolves the session cookie and issues a new one once a
/// fresh session has been stored.
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_id = session_cookie(request.headers());
    let (session, fresh) = state.sessions.resolve(cookie_id.as_deref());
    let id = session.id().to_string();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    // Only sessions that were actually written need a cookie.
    if fresh && state.sessions.contains(&id) {
        if let Some(value) = session_cookie_header(&id) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

fn session_cookie_header(id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}
