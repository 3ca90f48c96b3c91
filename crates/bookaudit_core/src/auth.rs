//! Caller authorization and the authorized session handle.
//!
//! # Responsibility
//! - Admit or reject a caller identity against the `users` allow-list.
//! - Record every attempt as an audit event, whatever the outcome.
//! - Hand out the only capability through which repositories and the audit
//!   query are reachable.
//!
//! # Invariants
//! - The attempt's event is committed for admitted and rejected callers alike.
//! - A session borrows one connection and is bound to one identity; the
//!   connection is `!Sync`, so a session cannot be shared across threads.

use crate::audit::filter::Filter;
use crate::audit::query::query_events;
use crate::audit::writer::record_event;
use crate::model::event::{AuditEvent, Operation, OBJECT_AUTH};
use crate::repo::error::{RepoError, RepoResult, StorageContext};
use log::{debug, error, warn};
use rusqlite::{Connection, InterruptHandle, Transaction, TransactionBehavior};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity is not on the allow-list.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("authorization: {0}")]
    Internal(#[from] RepoError),
}

/// Authorized handle bound to one caller and one connection.
#[derive(Debug)]
pub struct AuditSession<'conn> {
    conn: &'conn Connection,
    user: String,
}

impl<'conn> AuditSession<'conn> {
    /// Identity recorded on every event written through this session.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Handle another thread can use to abort the statement in flight.
    ///
    /// An interrupted operation rolls back and reports a storage error for
    /// which [`RepoError::is_interrupted`] is true.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Lists audit events matching every filter. Writes no event of its own.
    pub fn query_events(&self, filters: &[Filter]) -> RepoResult<Vec<AuditEvent>> {
        let result = query_events(self.conn, filters);
        match &result {
            Ok(events) => debug!(
                "event=events_query module=audit status=ok user={} filters={} rows={}",
                self.user,
                filters.len(),
                events.len()
            ),
            Err(err) => warn!(
                "event=events_query module=audit status=error user={} error={}",
                self.user, err
            ),
        }
        result
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

/// Checks `identity` against the allow-list and returns a session on success.
///
/// # Errors
/// - [`AuthError::Unauthorized`] when the identity is not registered; the
///   attempt is still recorded.
/// - [`AuthError::Internal`] on any storage failure; nothing is recorded.
pub fn authorize<'conn>(
    conn: &'conn Connection,
    identity: &str,
) -> Result<AuditSession<'conn>, AuthError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .context("begin transaction")?;

    let admitted = match check_allow_list(&tx, identity) {
        Ok(admitted) => admitted,
        Err(err) => {
            // The check's error is the one the caller needs; a rollback
            // failure on top of it is only logged.
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=auth_rollback module=auth status=error user={} error={} cause={}",
                    identity, rollback_err, err
                );
            }
            return Err(err.into());
        }
    };
    tx.commit().context("commit transaction")?;

    if !admitted {
        warn!("event=authorize module=auth status=denied user={identity}");
        return Err(AuthError::Unauthorized(identity.to_string()));
    }

    debug!("event=authorize module=auth status=ok user={identity}");
    Ok(AuditSession {
        conn,
        user: identity.to_string(),
    })
}

fn check_allow_list(tx: &Connection, identity: &str) -> RepoResult<bool> {
    record_event(tx, identity, Operation::Read, OBJECT_AUTH, None)?;

    let mut stmt = tx.prepare("SELECT name FROM users;").context("query users")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query users")?;
    for name in names {
        if name.context("scan user row")? == identity {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Adds `name` to the allow-list. Registering an existing name is a no-op.
///
/// Administrative bootstrap; not audited.
pub fn register_user(conn: &Connection, name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(crate::model::ValidationError::Empty { field: "user name" }.into());
    }
    conn.execute("INSERT OR IGNORE INTO users (name) VALUES (?1);", [name])
        .context("insert user")?;
    Ok(())
}

/// Returns the registered user names in ascending order.
pub fn list_users(conn: &Connection) -> RepoResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM users ORDER BY name ASC;")
        .context("query users")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query users")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("scan user row")?;
    Ok(names)
}
