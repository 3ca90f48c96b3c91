//! Author domain model.
//!
//! # Invariants
//! - `name` is non-empty and holds only letters, spaces and periods.
//! - `date_of_birth` is set.

use super::{ensure_date_set, ValidationError, UNSET_DATE};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Storage-assigned author identity.
pub type AuthorId = i64;

static AUTHOR_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L} .]+$").expect("author name pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Zero until storage assigns one on create.
    #[serde(default)]
    pub id: AuthorId,
    pub name: String,
    #[serde(rename = "dateofbirth")]
    pub date_of_birth: NaiveDate,
}

impl Author {
    /// Creates an unsaved author.
    pub fn new(name: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        Self {
            id: 0,
            name: name.into(),
            date_of_birth,
        }
    }

    /// Checks name and birth date rules.
    ///
    /// Letters of any script are accepted; digits and punctuation other than
    /// periods are not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if !AUTHOR_NAME_PATTERN.is_match(&self.name) {
            let found = self
                .name
                .chars()
                .find(|c| !(c.is_alphabetic() || *c == ' ' || *c == '.'))
                .unwrap_or('?');
            return Err(ValidationError::InvalidCharacter {
                field: "name",
                found,
            });
        }
        ensure_date_set("date of birth", self.date_of_birth)
    }

    /// Applies the set fields of `patch` onto this record.
    pub fn apply(&mut self, patch: &AuthorPatch) {
        if let Some(name) = patch.name.as_deref().filter(|name| !name.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(date) = patch.date_of_birth.filter(|date| *date != UNSET_DATE) {
            self.date_of_birth = date;
        }
    }
}

/// Partial author change. Empty fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "dateofbirth")]
    pub date_of_birth: Option<NaiveDate>,
}
