//! User-defined signals raised by triggers and stored procedures.
//!
//! # Responsibility
//! - Define the numbered business-rule codes shared by SQL and Rust code.
//! - Recognize `[NNNN] text` abort messages in SQLite errors.
//!
//! # Invariants
//! - Only codes listed in `SignalCode` are mapped; everything else stays a
//!   plain SQLite error.
//! - The signal message never contains the `[NNNN]` prefix.

use super::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SIGNAL_MESSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d{4})\]\s*(.*)$").expect("valid signal regex"));

/// Numbered business-rule violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCode {
    /// Patient already holds an open registration for the same doctor today.
    DuplicateRegistration,
    /// Registration is not in the state the operation requires.
    InvalidRegistrationState,
    /// Requested quantity exceeds stored drug quantity.
    InsufficientStock,
    /// Referenced patient/department/doctor/drug/payment is unknown.
    InvalidReference,
}

impl SignalCode {
    pub fn code(self) -> u16 {
        match self {
            Self::DuplicateRegistration => 1001,
            Self::InvalidRegistrationState => 1002,
            Self::InsufficientStock => 1003,
            Self::InvalidReference => 1004,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1001 => Some(Self::DuplicateRegistration),
            1002 => Some(Self::InvalidRegistrationState),
            1003 => Some(Self::InsufficientStock),
            1004 => Some(Self::InvalidReference),
            _ => None,
        }
    }
}

/// Typed business-rule violation carried out of the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSignal {
    pub code: SignalCode,
    pub message: String,
}

impl DomainSignal {
    pub fn new(code: SignalCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parses a `[NNNN] text` message. Returns `None` for unknown codes.
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = SIGNAL_MESSAGE_RE.captures(raw.trim())?;
        let code = captures.get(1)?.as_str().parse::<u16>().ok()?;
        let code = SignalCode::from_code(code)?;
        let message = captures.get(2).map_or("", |m| m.as_str()).trim();
        Some(Self::new(code, message))
    }

    /// Renders the wire form used inside SQL `RAISE` messages.
    pub fn to_raw(&self) -> String {
        format!("[{}] {}", self.code.code(), self.message)
    }
}

impl Display for DomainSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for DomainSignal {}

/// Builds a signal error from procedure code.
pub fn signal(code: SignalCode, message: impl Into<String>) -> DbError {
    DbError::Signal(DomainSignal::new(code, message))
}

/// Maps a raw SQLite error into `DbError`, lifting recognized signals.
pub fn classify_error(err: rusqlite::Error) -> DbError {
    if let rusqlite::Error::SqliteFailure(_, Some(message)) = &err {
        if let Some(signal) = DomainSignal::parse(message) {
            return DbError::Signal(signal);
        }
    }
    DbError::Sqlite(err)
}
