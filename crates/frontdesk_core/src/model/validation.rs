//! Input validation errors shared by model records.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is missing or blank.
    MissingField(&'static str),
    /// Numeric field must be zero or greater.
    NegativeValue(&'static str),
    /// Numeric field must be strictly greater than zero.
    NonPositiveValue(&'static str),
    /// Date field is not in `YYYY-MM-DD` form.
    InvalidDate(&'static str),
}

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::NegativeValue(field) => write!(f, "`{field}` must not be negative"),
            Self::NonPositiveValue(field) => write!(f, "`{field}` must be greater than zero"),
            Self::InvalidDate(field) => write!(f, "`{field}` must be a YYYY-MM-DD date"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Collapses blank optional text to `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn require_date(value: &str, field: &'static str) -> Result<(), ValidationError> {
    require_text(value, field)?;
    if !ISO_DATE_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidDate(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{non_blank, require_date, ValidationError};

    #[test]
    fn require_date_accepts_iso_dates_only() {
        assert!(require_date("1990-01-31", "date_of_birth").is_ok());
        assert_eq!(
            require_date("1990/01/31", "date_of_birth"),
            Err(ValidationError::InvalidDate("date_of_birth"))
        );
        assert_eq!(
            require_date("  ", "date_of_birth"),
            Err(ValidationError::MissingField("date_of_birth"))
        );
    }

    #[test]
    fn non_blank_collapses_whitespace_to_none() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}
