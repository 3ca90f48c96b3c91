//! Transactional operation wrapper.
//!
//! # Invariants
//! - An action either commits as a whole or leaves no visible writes.
//! - The action's own error is what the caller sees; a failed rollback is
//!   attached to it, never substituted for it.
//! - Transactions start IMMEDIATE so the write lock is taken (or waited
//!   for) up front rather than on the first write.

use crate::repo::error::{RepoError, RepoResult, StorageContext};
use log::error;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// A unit of work run against a transaction-scoped connection.
///
/// Implemented for any `FnOnce(&Connection) -> RepoResult<T>`; the connection
/// passed in is the open transaction, so the action cannot commit or roll
/// back on its own.
pub trait TxAction {
    type Output;

    fn run(self, tx: &Connection) -> RepoResult<Self::Output>;
}

impl<F, T> TxAction for F
where
    F: FnOnce(&Connection) -> RepoResult<T>,
{
    type Output = T;

    fn run(self, tx: &Connection) -> RepoResult<T> {
        self(tx)
    }
}

/// Runs `action` in one transaction on `conn`.
pub fn run_in_transaction<A: TxAction>(conn: &Connection, action: A) -> RepoResult<A::Output> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .context("begin transaction")?;

    match action.run(&tx) {
        Ok(output) => {
            tx.commit().context("commit transaction")?;
            Ok(output)
        }
        Err(err) => match tx.rollback() {
            Ok(()) => Err(err),
            Err(rollback_err) => {
                error!(
                    "event=tx_rollback module=tx status=error error={} cause={}",
                    rollback_err, err
                );
                Err(RepoError::Rollback {
                    original: Box::new(err),
                    source: rollback_err,
                })
            }
        },
    }
}
