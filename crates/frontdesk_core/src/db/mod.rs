//! SQLite storage bootstrap, schema migrations and user-defined signals.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the front-desk core.
//! - Apply schema migrations (tables + triggers) in deterministic order.
//! - Translate user-defined signals raised by triggers/procedures into
//!   typed errors.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - A signal is only recognized when its code is a known `SignalCode`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod signal;

pub use open::{open_db, open_db_in_memory};
pub use signal::{classify_error, signal, DomainSignal, SignalCode};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Business-rule violation raised by a trigger or stored procedure.
    Signal(DomainSignal),
}

impl DbError {
    /// Returns the domain signal carried by this error, if any.
    pub fn as_signal(&self) -> Option<&DomainSignal> {
        match self {
            Self::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Signal(signal) => write!(f, "{signal}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Signal(signal) => Some(signal),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        classify_error(value)
    }
}
