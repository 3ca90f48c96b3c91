//! Domain model for the audited catalogue.
//!
//! # Responsibility
//! - Define the two business records (authors, books) and the audit event.
//! - Own field-level validation rules applied before persistence.
//!
//! # Invariants
//! - Identities are assigned by storage and never reused.
//! - Audit events are immutable once written.

pub mod author;
pub mod book;
pub mod event;

use chrono::NaiveDate;
use thiserror::Error;

/// Date value meaning "never set". Dates on or before it fail validation.
pub const UNSET_DATE: NaiveDate = NaiveDate::MIN;

/// Field-level validation failure for a domain record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} contains unexpected character `{found}`")]
    InvalidCharacter { field: &'static str, found: char },
    #[error("{field} must be set")]
    DateNotSet { field: &'static str },
}

pub(crate) fn ensure_date_set(field: &'static str, date: NaiveDate) -> Result<(), ValidationError> {
    if date <= last_unset_date() {
        return Err(ValidationError::DateNotSet { field });
    }
    Ok(())
}

fn last_unset_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(UNSET_DATE)
}
