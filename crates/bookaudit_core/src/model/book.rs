//! Book domain model.
//!
//! # Invariants
//! - `title` is non-empty.
//! - `published` is set.
//! - `author_id` refers to an existing author; storage enforces this.

use super::author::AuthorId;
use super::{ensure_date_set, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage-assigned book identity.
pub type BookId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: BookId,
    #[serde(default)]
    pub author_id: AuthorId,
    pub title: String,
    pub published: NaiveDate,
}

impl Book {
    /// Creates an unsaved book owned by `author_id`.
    pub fn new(author_id: AuthorId, title: impl Into<String>, published: NaiveDate) -> Self {
        Self {
            id: 0,
            author_id,
            title: title.into(),
            published,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        ensure_date_set("published", self.published)
    }
}

/// Partial book change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published: Option<NaiveDate>,
}
