//! Audited repositories for authors and books.
//!
//! # Responsibility
//! - Define the CRUD contracts reachable through an authorized session.
//! - Pair every data statement with exactly one audit event in one
//!   transaction.
//!
//! # Invariants
//! - Write paths call `validate()` before any SQL runs.
//! - NotFound from Get/Update/Delete is reported after commit, so the audit
//!   event for the attempt is kept.

pub mod author_repo;
pub mod book_repo;
pub mod error;

use error::RepoResult;
use log::{debug, warn};

/// Logs the outcome of one repository call and passes it through.
pub(crate) fn traced<T>(event: &'static str, user: &str, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=repo status=ok user={user}"),
        Err(err) if err.is_not_found() => {
            debug!("event={event} module=repo status=not_found user={user} error={err}")
        }
        Err(err) => warn!("event={event} module=repo status=error user={user} error={err}"),
    }
    result
}
